use std::time::Duration;

use super::canvas::Canvas;
use super::geometry::Vec2;
use super::input::{ActionStates, InputAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    MainMenu,
    Gameplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    HardResetTo(SceneKey),
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    confirm_pressed: bool,
    back_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        confirm_pressed: bool,
        back_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_click_pressed,
            confirm_pressed,
            back_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_back_pressed(mut self, back_pressed: bool) -> Self {
        self.back_pressed = back_pressed;
        self
    }

    /// Cursor position in frame-buffer pixels.
    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn back_pressed(&self) -> bool {
        self.back_pressed
    }
}

/// Per-scene simulation state owned by the scene machine. The clock only advances
/// while the scene is active, so a paused scene resumes where it left off.
#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    elapsed: Duration,
    tick_count: u64,
}

impl SceneWorld {
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_clock(&mut self, fixed_dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(fixed_dt);
        self.tick_count = self.tick_count.saturating_add(1);
    }

    pub fn clear(&mut self) {
        self.elapsed = Duration::ZERO;
        self.tick_count = 0;
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &SceneWorld, canvas: &mut Canvas);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
    /// Extra lines for the F3 overlay.
    fn debug_lines(&self, _world: &SceneWorld) -> Vec<String> {
        Vec::new()
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }
}

pub(crate) struct SceneMachine {
    main_menu: SceneRuntime,
    gameplay: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        main_menu: Box<dyn Scene>,
        gameplay: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            main_menu: SceneRuntime::new(main_menu),
            gameplay: SceneRuntime::new(gameplay),
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self) {
        self.load_scene_if_needed(self.active_scene);
    }

    /// Advances the active scene's clock by one fixed step, then updates it.
    pub(crate) fn update_active(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        runtime.world.advance_clock(fixed_dt);
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt.as_secs_f32(), input, world)
    }

    pub(crate) fn render_active(&mut self, canvas: &mut Canvas) {
        let runtime = self.active_runtime_mut();
        runtime.scene.render(&runtime.world, canvas);
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    pub(crate) fn debug_lines_active(&self) -> Vec<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_lines(&runtime.world)
    }

    pub(crate) fn switch_to(&mut self, next_scene: SceneKey) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        self.load_scene_if_needed(next_scene);
        self.active_scene = next_scene;
        true
    }

    pub(crate) fn hard_reset_to(&mut self, next_scene: SceneKey) -> bool {
        let runtime = self.runtime_mut(next_scene);
        if runtime.is_loaded {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.unload(world);
        }
        runtime.world.clear();
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
        let changed = self.active_scene != next_scene;
        self.active_scene = next_scene;
        changed
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in [&mut self.main_menu, &mut self.gameplay] {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_scene_if_needed(&mut self, key: SceneKey) {
        if self.runtime_ref(key).is_loaded {
            return;
        }
        let runtime = self.runtime_mut(key);
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(world);
        }
        runtime.is_loaded = true;
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::MainMenu => &mut self.main_menu,
            SceneKey::Gameplay => &mut self.gameplay,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::MainMenu => &self.main_menu,
            SceneKey::Gameplay => &self.gameplay,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    const TICK: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct Log {
        events: Vec<String>,
    }

    struct RecordingScene {
        name: &'static str,
        log: Rc<RefCell<Log>>,
        updates_seen: u32,
    }

    impl RecordingScene {
        fn boxed(name: &'static str, log: &Rc<RefCell<Log>>) -> Box<dyn Scene> {
            Box::new(Self {
                name,
                log: Rc::clone(log),
                updates_seen: 0,
            })
        }
    }

    impl Scene for RecordingScene {
        fn load(&mut self, _world: &mut SceneWorld) {
            self.updates_seen = 0;
            self.log.borrow_mut().events.push(format!("load:{}", self.name));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            self.updates_seen += 1;
            if input.back_pressed() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, world: &SceneWorld, canvas: &mut Canvas) {
            canvas.fill([world.tick_count() as u8, 0, 0, 255]);
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.log.borrow_mut().events.push(format!("unload:{}", self.name));
        }

        fn debug_lines(&self, _world: &SceneWorld) -> Vec<String> {
            vec![format!("updates: {}", self.updates_seen)]
        }
    }

    fn machine(log: &Rc<RefCell<Log>>) -> SceneMachine {
        SceneMachine::new(
            RecordingScene::boxed("menu", log),
            RecordingScene::boxed("gameplay", log),
            SceneKey::MainMenu,
        )
    }

    #[test]
    fn update_advances_only_the_active_clock() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();

        for _ in 0..3 {
            let _ = machine.update_active(TICK, &InputSnapshot::empty());
        }
        assert_eq!(machine.active_world().now(), TICK * 3);

        assert!(machine.switch_to(SceneKey::Gameplay));
        let _ = machine.update_active(TICK, &InputSnapshot::empty());
        assert_eq!(machine.active_world().tick_count(), 1);

        assert!(machine.switch_to(SceneKey::MainMenu));
        assert_eq!(machine.active_world().now(), TICK * 3);
        assert_eq!(machine.debug_lines_active(), vec!["updates: 3".to_string()]);
    }

    #[test]
    fn switching_to_active_scene_is_a_no_op() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();
        assert!(!machine.switch_to(SceneKey::MainMenu));
        assert_eq!(log.borrow().events, vec!["load:menu".to_string()]);
    }

    #[test]
    fn hard_reset_reloads_scene_and_clears_clock() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();
        assert!(machine.switch_to(SceneKey::Gameplay));
        let _ = machine.update_active(TICK, &InputSnapshot::empty());

        assert!(!machine.hard_reset_to(SceneKey::Gameplay));
        assert_eq!(machine.active_world().now(), Duration::ZERO);
        assert_eq!(
            log.borrow().events,
            vec![
                "load:menu".to_string(),
                "load:gameplay".to_string(),
                "unload:gameplay".to_string(),
                "load:gameplay".to_string(),
            ]
        );
    }

    #[test]
    fn commands_come_from_the_active_scene() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();
        let command =
            machine.update_active(TICK, &InputSnapshot::empty().with_back_pressed(true));
        assert_eq!(command, SceneCommand::Quit);
    }

    #[test]
    fn shutdown_unloads_every_loaded_scene_once() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();
        machine.shutdown_all();
        machine.shutdown_all();

        assert_eq!(
            log.borrow().events,
            vec!["load:menu".to_string(), "unload:menu".to_string()]
        );
    }

    #[test]
    fn render_receives_active_world() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut machine = machine(&log);
        machine.load_active();
        let _ = machine.update_active(TICK, &InputSnapshot::empty());
        let mut canvas = Canvas::new(4, 4);
        machine.render_active(&mut canvas);
        assert!(matches!(
            canvas.commands()[0],
            super::super::canvas::DrawCommand::Fill([1, 0, 0, 255])
        ));
    }

    #[test]
    fn input_builders_round_trip() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::Interact, true)
            .with_cursor_position_px(Some(Vec2::new(3.0, 4.0)))
            .with_left_click_pressed(true)
            .with_confirm_pressed(true);
        assert!(input.is_down(InputAction::Interact));
        assert!(!input.is_down(InputAction::MoveUp));
        assert_eq!(input.cursor_position_px(), Some(Vec2::new(3.0, 4.0)));
        assert!(input.left_click_pressed());
        assert!(input.confirm_pressed());
        assert!(!input.back_pressed());
        assert!(!input.quit_requested());
    }
}
