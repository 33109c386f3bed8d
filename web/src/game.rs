use crate::utils::*;
use chrono::prelude::*;
use gloo::timers::callback::Interval;
use rand::prelude::*;
use riffel_core as game;
use yew::prelude::*;

/// One letter appears per step of the opening animation.
const REVEAL_STEP_MS: u32 = 100;
/// Blackout cadence once every letter is out.
const BLACKOUT_INTERVAL_MS: u32 = 2_000;
const CLOCK_INTERVAL_MS: u32 = 500;

fn utc_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64).unwrap()
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewCellState {
    Veiled,
    Blank,
    Selected,
    Greyed,
    Confirmed,
    ForcedReveal,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewStage {
    NotStarted,
    Revealing,
    Live,
    Settled,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Session {
    pub engine: game::GameEngine,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    shown_cells: game::CellCount,
}

impl Session {
    fn new(engine: game::GameEngine) -> Self {
        Self {
            engine,
            started_at: None,
            ended_at: None,
            shown_cells: 0,
        }
    }

    fn begin(&mut self, now: DateTime<Utc>) -> game::StartOutcome {
        let outcome = self.engine.start();
        if outcome.has_update() {
            self.started_at = Some(now);
        }
        outcome
    }

    fn all_shown(&self) -> bool {
        self.shown_cells == self.engine.puzzle().total_cells()
    }

    /// Whether the opening animation has reached this cell yet (row-major).
    fn is_shown(&self, coords: game::Coord2) -> bool {
        let (row, col) = coords;
        let index = game::mult(row, self.engine.puzzle().cols()) + game::CellCount::from(col);
        index < self.shown_cells
    }

    /// Shows the next letter; false once every cell is already out.
    fn advance_reveal(&mut self) -> bool {
        if self.all_shown() {
            return false;
        }
        self.shown_cells += 1;
        true
    }

    fn toggle(&mut self, coords: game::Coord2, now: DateTime<Utc>) -> game::ToggleOutcome {
        let outcome = self.engine.toggle(coords);
        if outcome.has_update() {
            self.note_settled(now);
        }
        outcome
    }

    fn tick<R: Rng>(&mut self, rng: &mut R, now: DateTime<Utc>) -> game::TickOutcome {
        let outcome = self.engine.tick(rng);
        if outcome.has_update() {
            self.note_settled(now);
        }
        outcome
    }

    fn note_settled(&mut self, now: DateTime<Utc>) {
        if self.engine.is_settled() && self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
    }

    fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or(now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    fn stage(&self) -> ViewStage {
        if !self.engine.phase().is_running() {
            ViewStage::NotStarted
        } else if self.engine.is_settled() {
            ViewStage::Settled
        } else if !self.all_shown() {
            ViewStage::Revealing
        } else {
            ViewStage::Live
        }
    }

    fn cell_view(&self, coords: game::Coord2) -> ViewCellState {
        if !self.is_shown(coords) {
            return ViewCellState::Veiled;
        }
        match self.engine.cell_at(coords) {
            game::CellState::Blank => ViewCellState::Blank,
            game::CellState::Selected => ViewCellState::Selected,
            game::CellState::Greyed => ViewCellState::Greyed,
            game::CellState::Confirmed => ViewCellState::Confirmed,
            game::CellState::ForcedReveal => ViewCellState::ForcedReveal,
        }
    }

    fn can_interact_at(&self, coords: game::Coord2) -> bool {
        self.is_shown(coords) && self.engine.can_interact_at(coords)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Start,
    RevealStep,
    BlackoutTick,
    UpdateTime,
    CellClicked(game::Coord2),
    NewGame,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    row: game::Coord,
    col: game::Coord,
    cell_state: ViewCellState,
    letter: char,
    #[prop_or_default]
    locked: bool,
    callback: Callback<game::Coord2>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    use ViewCellState::*;

    let CellProps {
        row,
        col,
        cell_state,
        letter,
        locked,
        callback,
    } = props.clone();

    let mut class = classes!(
        "cell",
        match cell_state {
            Veiled => classes!(),
            Blank => classes!("letter"),
            Selected => classes!("letter", "picked"),
            Greyed => classes!("letter", "greyed"),
            Confirmed => classes!("letter", "matched"),
            ForcedReveal => classes!("letter", "exposed"),
        }
    );
    if locked {
        class.push("locked");
    }

    let onclick = Callback::from(move |e: MouseEvent| {
        e.stop_propagation();
        callback.emit((row, col));
        log::trace!("({}, {}) clicked", row, col);
    });

    let text = match cell_state {
        Veiled => String::new(),
        _ => letter.to_string(),
    };

    html! {
        <td {class} {onclick}>{text}</td>
    }
}

#[derive(Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[prop_or_default]
    pub seed: Option<u64>,
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: Session,
    rng: SmallRng,
    seed: u64,
    prev_time: u32,
    reveal_timer: Option<Interval>,
    blackout_timer: Option<Interval>,
    _clock: Interval,
}

impl GameView {
    fn create_clock(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(CLOCK_INTERVAL_MS, move || link.send_message(Msg::UpdateTime))
    }

    fn start_reveal_timer(&mut self, ctx: &Context<Self>) {
        let link = ctx.link().clone();
        self.reveal_timer = Some(Interval::new(REVEAL_STEP_MS, move || {
            link.send_message(Msg::RevealStep)
        }));
    }

    fn start_blackout_timer(&mut self, ctx: &Context<Self>) {
        let link = ctx.link().clone();
        self.blackout_timer = Some(Interval::new(BLACKOUT_INTERVAL_MS, move || {
            link.send_message(Msg::BlackoutTick)
        }));
    }

    fn get_time(&self) -> u32 {
        self.session.elapsed_secs(utc_now())
    }

    fn stage_class(&self) -> Classes {
        use ViewStage::*;
        classes!(match self.session.stage() {
            NotStarted => "not-started",
            Revealing => "revealing",
            Live => "in-progress",
            Settled => "settled",
        })
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        Self {
            session: Session::new(game::GameEngine::new(game::Puzzle::classic())),
            rng: SmallRng::seed_from_u64(seed),
            seed,
            prev_time: 0,
            reveal_timer: None,
            blackout_timer: None,
            _clock: GameView::create_clock(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Start => {
                if !self.session.begin(utc_now()).has_update() {
                    return false;
                }
                log::debug!("session started (seed: {})", self.seed);
                self.start_reveal_timer(ctx);
                true
            }
            RevealStep => {
                let shown = self.session.advance_reveal();
                if self.session.all_shown() && self.reveal_timer.take().is_some() {
                    // all letters out: swap the stagger for the blackout clock,
                    // which fires once right away
                    self.start_blackout_timer(ctx);
                    ctx.link().send_message(BlackoutTick);
                }
                shown
            }
            BlackoutTick => {
                let outcome = self.session.tick(&mut self.rng, utc_now());
                log::trace!("blackout tick: {:?}", outcome);
                if self.session.engine.is_settled() {
                    self.blackout_timer = None;
                }
                outcome.has_update()
            }
            UpdateTime => {
                let time = self.get_time();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            CellClicked(pos) => {
                if !self.session.is_shown(pos) {
                    return false;
                }
                let outcome = self.session.toggle(pos, utc_now());
                log::debug!("toggle {:?}: {:?}", pos, outcome);
                if self.session.engine.is_settled() {
                    self.blackout_timer = None;
                }
                outcome.has_update()
            }
            NewGame => {
                self.seed = js_random_seed();
                self.rng = SmallRng::seed_from_u64(self.seed);
                self.session = Session::new(game::GameEngine::new(game::Puzzle::classic()));
                self.reveal_timer = None;
                self.blackout_timer = None;
                self.prev_time = 0;
                log::debug!("new game (seed: {})", self.seed);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let (rows, cols) = self.session.engine.puzzle().size();
        let stage_class = self.stage_class();
        let live = matches!(self.session.stage(), ViewStage::Live);
        let rows_left = format_for_counter(u32::from(self.session.engine.rows_left()));
        let elapsed_time = format_for_counter(self.get_time());

        let cb_start = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Start
        });
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });

        html! {
            <div class="riffel">
                <nav>
                    <aside>{rows_left}</aside>
                    <span>
                        <button class={stage_class} onclick={cb_start}/>
                        <button class="next" onclick={cb_new_game}/>
                    </span>
                    <aside>{elapsed_time}</aside>
                </nav>
                <table class={live.then_some("live")}>
                    {
                        for (0..rows).map(|row| html! {
                            <tr>
                                {
                                    for (0..cols).map(|col| {
                                        let pos = (row, col);
                                        let cell_state = self.session.cell_view(pos);
                                        let letter = self.session.engine.puzzle()[pos];
                                        let locked = !self.session.can_interact_at(pos);
                                        let callback = ctx.link().callback(CellClicked);
                                        html! {
                                            <CellView {row} {col} {cell_state} {letter} {locked} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(secs * 1000).unwrap()
    }

    fn classic_session() -> Session {
        Session::new(game::GameEngine::new(game::Puzzle::classic()))
    }

    fn solve_row(session: &mut Session, row: game::Coord, at: DateTime<Utc>) {
        let targets: Vec<game::Coord> = session.engine.puzzle().target_cols(row).collect();
        for col in targets {
            if !session.engine.is_selected((row, col)) {
                session.toggle((row, col), at);
            }
        }
    }

    #[test]
    fn reveal_order_is_row_major() {
        let mut session = classic_session();
        session.begin(t(0));
        assert!(!session.is_shown((0, 0)));

        session.advance_reveal();
        assert!(session.is_shown((0, 0)));
        assert!(!session.is_shown((0, 1)));

        for _ in 0..10 {
            session.advance_reveal();
        }
        // eleven letters out: the whole first row plus one
        assert!(session.is_shown((0, 9)));
        assert!(session.is_shown((1, 0)));
        assert!(!session.is_shown((1, 1)));
    }

    #[test]
    fn reveal_reports_only_newly_shown_letters() {
        let mut session = classic_session();
        session.begin(t(0));

        let total = session.engine.puzzle().total_cells();
        for _ in 0..total {
            assert!(!session.all_shown());
            assert!(session.advance_reveal());
        }
        assert!(session.all_shown());
        assert_eq!(session.shown_cells, total);

        // stray animation steps after the last letter change nothing
        assert!(!session.advance_reveal());
        assert_eq!(session.shown_cells, total);
        assert!(session.all_shown());
    }

    #[test]
    fn cells_stay_veiled_until_the_animation_reaches_them() {
        let mut session = classic_session();
        session.begin(t(0));
        assert_eq!(session.cell_view((0, 2)), ViewCellState::Veiled);
        assert!(!session.can_interact_at((0, 2)));

        for _ in 0..3 {
            session.advance_reveal();
        }
        assert_eq!(session.cell_view((0, 2)), ViewCellState::Blank);
        assert!(session.can_interact_at((0, 2)));
        assert_eq!(session.cell_view((0, 3)), ViewCellState::Veiled);
    }

    #[test]
    fn view_states_follow_the_engine_once_shown() {
        let mut session = classic_session();
        session.begin(t(0));
        while session.advance_reveal() {}

        session.toggle((0, 2), t(1));
        assert_eq!(session.cell_view((0, 2)), ViewCellState::Selected);

        solve_row(&mut session, 0, t(2));
        assert_eq!(session.cell_view((0, 2)), ViewCellState::Confirmed);
        assert_eq!(session.cell_view((0, 0)), ViewCellState::Greyed);
    }

    #[test]
    fn stage_tracks_the_session_lifecycle() {
        let mut session = classic_session();
        assert_eq!(session.stage(), ViewStage::NotStarted);

        session.begin(t(0));
        assert_eq!(session.stage(), ViewStage::Revealing);

        while session.advance_reveal() {}
        assert_eq!(session.stage(), ViewStage::Live);

        for row in 0..session.engine.puzzle().rows() {
            solve_row(&mut session, row, t(5));
        }
        assert_eq!(session.stage(), ViewStage::Settled);
    }

    #[test]
    fn elapsed_runs_while_live_and_freezes_once_settled() {
        let mut session = classic_session();
        assert_eq!(session.elapsed_secs(t(99)), 0);

        session.begin(t(0));
        assert_eq!(session.elapsed_secs(t(5)), 5);

        for row in 0..session.engine.puzzle().rows() {
            solve_row(&mut session, row, t(8));
        }
        assert_eq!(session.ended_at, Some(t(8)));
        assert_eq!(session.elapsed_secs(t(100)), 8);
    }

    #[test]
    fn blackout_ticks_stamp_the_end_time() {
        let mut session = classic_session();
        session.begin(t(0));
        while session.advance_reveal() {}

        let mut rng = SmallRng::seed_from_u64(13);
        while !session.engine.is_settled() {
            session.tick(&mut rng, t(70));
        }
        assert_eq!(session.ended_at, Some(t(70)));
        assert_eq!(session.elapsed_secs(t(200)), 70);
        assert_eq!(session.stage(), ViewStage::Settled);
    }

    #[test]
    fn begin_is_idempotent_and_keeps_the_first_timestamp() {
        let mut session = classic_session();
        assert!(session.begin(t(3)).has_update());
        assert!(!session.begin(t(9)).has_update());
        assert_eq!(session.started_at, Some(t(3)));
    }
}
