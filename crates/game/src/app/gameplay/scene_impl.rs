pub(crate) struct GameplayScene {
    content: Rc<GameContent>,
    selection: LevelSelection,
    bounds: Rect,
    fonts: HudFonts,
    session: Option<LevelSession>,
}

impl GameplayScene {
    pub(crate) fn new(content: Rc<GameContent>, selection: LevelSelection, bounds: Rect) -> Self {
        let fonts = HudFonts::from_assets(&content.assets);
        Self {
            content,
            selection,
            bounds,
            fonts,
            session: None,
        }
    }

    fn phase(&self) -> ScenePhase {
        self.session
            .as_ref()
            .map_or(ScenePhase::Inactive, |session| session.phase)
    }

    fn start_level(&self, number: u32, now: Duration) -> Result<LevelSession, LevelLoadError> {
        let defs = &self.content.defs;
        let assets = &self.content.assets;
        let level = defs
            .level(number)
            .ok_or(LevelLoadError::UnknownLevel { number })?;
        let monsters = WaveMonsterManager::from_level(level, defs, assets, self.bounds, now);
        LevelSession::start(level, defs, assets, self.bounds, now, Box::new(monsters))
    }
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let number = self.selection.get();
        match self.start_level(number, world.now()) {
            Ok(session) => {
                info!(
                    level = number,
                    pickups = session.pickups.len(),
                    duration_seconds = session.level_duration.as_secs_f32(),
                    victory_monster_limit = session.victory_monster_limit,
                    "level_loaded"
                );
                self.session = Some(session);
            }
            Err(error) => {
                error!(level = number, error = %error, "level_load_failed");
                self.session = None;
            }
        }
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.back_pressed() {
            return SceneCommand::SwitchTo(SceneKey::MainMenu);
        }
        let Some(session) = self.session.as_mut() else {
            return SceneCommand::SwitchTo(SceneKey::MainMenu);
        };
        if session.phase.is_finished() {
            if input.confirm_pressed() {
                return SceneCommand::SwitchTo(SceneKey::MainMenu);
            }
            return SceneCommand::None;
        }

        session.step(input, world.now());
        SceneCommand::None
    }

    fn render(&mut self, world: &SceneWorld, canvas: &mut Canvas) {
        match &self.session {
            Some(session) => session.render(canvas, &self.fonts, world.now()),
            None => canvas.fill(BACKGROUND_FALLBACK_COLOR),
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        if let Some(session) = self.session.take() {
            debug!(level = session.level_number, phase = session.phase.label(), "level_unloaded");
        }
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some(format!(
            "Coast Guardian | Level {} | {}",
            self.selection.get(),
            self.phase().label()
        ))
    }

    fn debug_lines(&self, world: &SceneWorld) -> Vec<String> {
        let Some(session) = &self.session else {
            return vec![format!("Phase: {}", self.phase().label())];
        };
        vec![
            format!("Phase: {}", session.phase.label()),
            format!(
                "Equipped: {}",
                session
                    .player
                    .equipped
                    .as_ref()
                    .map_or("none", |equipped| equipped.weapon.def_name.as_str())
            ),
            format!("Pickups: {}", session.pickups.len()),
            format!("Projectiles: {}", session.projectiles.len()),
            format!(
                "Monsters: {} alive, {} escaped",
                session.monsters.alive_enemies().len(),
                session.monsters.escaped_count()
            ),
            format!("Elapsed: {:.1}s", session.elapsed(world.now()).as_secs_f32()),
        ]
    }
}
