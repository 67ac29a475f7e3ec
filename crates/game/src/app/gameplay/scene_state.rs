/// Everything that lives for one attempt at one level.
struct LevelSession {
    level_number: u32,
    bounds: Rect,
    background: Option<Arc<Bitmap>>,
    walkable: WalkabilityMask,
    player: Player,
    pickups: Vec<WeaponPickup>,
    projectiles: Vec<Projectile>,
    monsters: Box<dyn MonsterManager>,
    phase: ScenePhase,
    level_start_time: Duration,
    level_duration: Duration,
    victory_monster_limit: u32,
}

impl LevelSession {
    fn start(
        level: &LevelDef,
        defs: &DefDatabase,
        assets: &AssetStore,
        bounds: Rect,
        now: Duration,
        monsters: Box<dyn MonsterManager>,
    ) -> Result<Self, LevelLoadError> {
        let mask_bitmap =
            assets
                .image(&level.walkable_mask)
                .ok_or_else(|| LevelLoadError::MissingWalkableMask {
                    number: level.number,
                    key: level.walkable_mask.clone(),
                })?;
        let walkable = WalkabilityMask::from_bitmap(&mask_bitmap);

        let background = assets.image(&level.background).map(|image| {
            let (width, height) = (bounds.width as u32, bounds.height as u32);
            if image.width() == width && image.height() == height {
                image
            } else {
                Arc::new(image.scaled(width, height))
            }
        });

        let player = Player::spawn(
            level,
            Sprite::from_image(assets.image(PLAYER_IMAGE_KEY), level.player_size),
        );

        let pickups = level
            .weapon_spawns
            .iter()
            .zip(0u32..)
            .filter_map(|(spawn, id)| WeaponPickup::build(PickupId(id), spawn, defs, assets))
            .collect();

        Ok(Self {
            level_number: level.number,
            bounds,
            background,
            walkable,
            player,
            pickups,
            projectiles: Vec::new(),
            monsters,
            phase: ScenePhase::Playing,
            level_start_time: now,
            level_duration: seconds_to_duration(level.duration_seconds),
            victory_monster_limit: level.victory_monster_limit,
        })
    }

    fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.level_start_time)
    }

    fn remaining_time(&self, now: Duration) -> Duration {
        self.level_duration.saturating_sub(self.elapsed(now))
    }

    /// Runs one frame in the fixed order player, monsters, projectiles, collisions,
    /// game over. Does nothing once the level has been decided.
    fn step(&mut self, input: &InputSnapshot, now: Duration) {
        if self.phase != ScenePhase::Playing {
            return;
        }

        self.player.update(
            input,
            now,
            &self.walkable,
            &mut self.pickups,
            &mut self.projectiles,
        );
        self.monsters.update(now);
        self.update_projectiles();
        let outcome = self.resolve_collisions();
        if outcome.projectiles_destroyed > 0 {
            debug!(
                projectiles_destroyed = outcome.projectiles_destroyed,
                enemies_killed = outcome.enemies_killed,
                "collisions_resolved"
            );
        }
        self.evaluate_game_over(now);
    }

    fn update_projectiles(&mut self) {
        let bounds = self.bounds;
        for projectile in &mut self.projectiles {
            projectile.advance();
        }
        self.projectiles
            .retain(|projectile| projectile.rect().overlaps(&bounds));
    }

    fn resolve_collisions(&mut self) -> CollisionOutcome {
        let enemies = self.monsters.alive_enemies_mut();
        let hits = find_hits(&self.projectiles, enemies);
        apply_hits(&hits, &mut self.projectiles, enemies)
    }

    fn total_failed(&self) -> u32 {
        self.monsters.escaped_count() + self.monsters.alive_enemies().len() as u32
    }

    fn evaluate_game_over(&mut self, now: Duration) -> Option<ScenePhase> {
        if self.phase != ScenePhase::Playing || self.elapsed(now) <= self.level_duration {
            return None;
        }

        let total_failed = self.total_failed();
        self.phase = if total_failed < self.victory_monster_limit {
            ScenePhase::Victory
        } else {
            ScenePhase::Defeat
        };
        info!(
            level = self.level_number,
            outcome = self.phase.label(),
            escaped = self.monsters.escaped_count(),
            alive = self.monsters.alive_enemies().len(),
            total_failed,
            limit = self.victory_monster_limit,
            "level_finished"
        );
        Some(self.phase)
    }

    fn render(&self, canvas: &mut Canvas, fonts: &HudFonts, now: Duration) {
        match &self.background {
            Some(background) => canvas.blit(background, (0, 0)),
            None => canvas.fill(BACKGROUND_FALLBACK_COLOR),
        }

        for pickup in &self.pickups {
            pickup.sprite.draw(canvas, pickup.rect, PICKUP_PLACEHOLDER_COLOR);
        }
        self.player.draw(canvas);
        self.monsters.draw(canvas);
        for projectile in &self.projectiles {
            projectile
                .sprite
                .draw(canvas, projectile.rect(), PROJECTILE_PLACEHOLDER_COLOR);
        }

        self.player.draw_ui(canvas, fonts.ui, &self.pickups, now);

        if self.phase == ScenePhase::Playing {
            self.draw_hud(canvas, fonts.ui, now);
        }

        if self.phase.is_finished() {
            let (text, color) = if self.phase == ScenePhase::Victory {
                (VICTORY_TEXT, WHITE)
            } else {
                (DEFEAT_TEXT, DEFEAT_COLOR)
            };
            canvas.draw_text(text, fonts.title, color, TextAnchor::Center, self.bounds.center());
        }
    }

    fn draw_hud(&self, canvas: &mut Canvas, font: FontHandle, now: Duration) {
        let right = self.bounds.right() - HUD_MARGIN_PX;
        let lines = [
            format!("Time: {:.1}", self.remaining_time(now).as_secs_f32()),
            format!("Remaining: {}", self.monsters.alive_enemies().len()),
            format!("Escaped: {}", self.monsters.escaped_count()),
        ];
        for (line, y) in lines.iter().zip(HUD_LINE_Y_PX) {
            canvas.draw_text(line, font, WHITE, TextAnchor::TopRight, (right, y));
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HudFonts {
    ui: FontHandle,
    title: FontHandle,
}

impl HudFonts {
    fn from_assets(assets: &AssetStore) -> Self {
        Self {
            ui: assets.font(UI_FONT_KEY).unwrap_or_default(),
            title: assets.font(TITLE_FONT_KEY).unwrap_or_default(),
        }
    }
}
