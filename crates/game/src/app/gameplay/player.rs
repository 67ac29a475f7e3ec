#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MoveIntent {
    dx: i32,
    dy: i32,
}

impl MoveIntent {
    fn from_input(input: &InputSnapshot, speed: i32) -> Self {
        let mut intent = Self::default();
        if input.is_down(InputAction::MoveLeft) {
            intent.dx -= speed;
        }
        if input.is_down(InputAction::MoveRight) {
            intent.dx += speed;
        }
        if input.is_down(InputAction::MoveUp) {
            intent.dy -= speed;
        }
        if input.is_down(InputAction::MoveDown) {
            intent.dy += speed;
        }
        intent
    }

    fn is_idle(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

#[derive(Debug, Clone)]
struct Player {
    rect: Rect,
    sprite: Sprite,
    /// Horizontal inset and upward lift of the two foot sample points.
    foot_offset: (i32, i32),
    speed: i32,
    equipped: Option<EquippedWeapon>,
    last_shot_time: Option<Duration>,
    can_interact: bool,
    prompt: Option<InteractionPrompt>,
}

impl Player {
    fn spawn(level: &LevelDef, sprite: Sprite) -> Self {
        Self {
            rect: Rect::from_mid_bottom(level.spawn_point, sprite.width, sprite.height),
            sprite,
            foot_offset: level.foot_offset,
            speed: PLAYER_SPEED_PX_PER_TICK,
            equipped: None,
            last_shot_time: None,
            can_interact: true,
            prompt: None,
        }
    }

    /// One tick of player logic: prompt, movement, interact latch, then firing.
    fn update(
        &mut self,
        input: &InputSnapshot,
        now: Duration,
        walkable: &WalkabilityMask,
        pickups: &mut Vec<WeaponPickup>,
        projectiles: &mut Vec<Projectile>,
    ) {
        self.check_interaction(pickups);
        self.move_by(MoveIntent::from_input(input, self.speed), walkable);

        if input.is_down(InputAction::Interact) {
            if self.can_interact {
                self.interact(pickups);
                self.can_interact = false;
                // Prompt must match the equip state before the frame renders.
                self.check_interaction(pickups);
            }
        } else {
            self.can_interact = true;
        }

        if input.left_click_pressed() {
            if let Some(target) = input.cursor_position_px() {
                if let Some(projectile) = self.shoot(target, now) {
                    projectiles.push(projectile);
                }
            }
        }
    }

    fn check_interaction(&mut self, pickups: &[WeaponPickup]) {
        if self.equipped.is_some() {
            self.prompt = Some(InteractionPrompt::Unequip);
            return;
        }

        let reach = self
            .rect
            .inflate(INTERACTION_MARGIN_PX, INTERACTION_MARGIN_PX);
        let center = self.rect.center_vec();
        self.prompt = pickups
            .iter()
            .filter(|pickup| reach.overlaps(&pickup.rect))
            .min_by(|a, b| {
                center
                    .distance(a.rect.center_vec())
                    .total_cmp(&center.distance(b.rect.center_vec()))
            })
            .map(|pickup| InteractionPrompt::Equip { target: pickup.id });
    }

    /// Tries the move and keeps it only if at least one foot lands on walkable ground.
    /// Returns whether the player moved.
    fn move_by(&mut self, intent: MoveIntent, walkable: &WalkabilityMask) -> bool {
        if self.equipped.is_some() || intent.is_idle() {
            return false;
        }

        let previous = self.rect;
        self.rect = self.rect.translated(intent.dx, intent.dy);
        let accepted = self
            .foot_points()
            .iter()
            .any(|point| walkable.is_walkable(*point));
        if !accepted {
            self.rect = previous;
        }
        accepted
    }

    fn foot_points(&self) -> [(i32, i32); 2] {
        let (inset, lift) = self.foot_offset;
        let (left, bottom) = self.rect.bottom_left();
        let (right, _) = self.rect.bottom_right();
        [(left + inset, bottom - lift), (right - inset, bottom - lift)]
    }

    fn interact(&mut self, pickups: &mut Vec<WeaponPickup>) {
        if let Some(previous) = self.equipped.take() {
            debug!(weapon = %previous.weapon.def_name, "weapon_unequipped");
            return;
        }

        let Some(InteractionPrompt::Equip { target }) = self.prompt else {
            return;
        };
        let Some(index) = pickups.iter().position(|pickup| pickup.id == target) else {
            return;
        };
        let pickup = pickups.remove(index);
        debug!(weapon = %pickup.weapon.def_name, "weapon_equipped");
        self.equipped = Some(EquippedWeapon {
            weapon: pickup.weapon,
            icon: pickup.sprite,
            projectile_sprite: pickup.projectile_sprite,
        });
    }

    fn shoot(&mut self, target: Vec2, now: Duration) -> Option<Projectile> {
        let equipped = self.equipped.as_ref()?;
        if let Some(last_shot) = self.last_shot_time {
            if now.saturating_sub(last_shot) <= equipped.cooldown() {
                return None;
            }
        }
        self.last_shot_time = Some(now);
        Some(Projectile::fired(self.rect.center_vec(), target, equipped))
    }

    /// Seconds left before the next shot, if the weapon is still cooling down.
    fn cooldown_remaining(&self, now: Duration) -> Option<f32> {
        let equipped = self.equipped.as_ref()?;
        let last_shot = self.last_shot_time?;
        let elapsed = now.saturating_sub(last_shot);
        let cooldown = equipped.cooldown();
        (elapsed < cooldown).then(|| (cooldown - elapsed).as_secs_f32())
    }

    fn draw(&self, canvas: &mut Canvas) {
        self.sprite.draw(canvas, self.rect, PLAYER_PLACEHOLDER_COLOR);
    }

    fn draw_ui(&self, canvas: &mut Canvas, font: FontHandle, pickups: &[WeaponPickup], now: Duration) {
        if let Some(equipped) = &self.equipped {
            let (center_x, _) = self.rect.center();
            let icon_rect = Rect::from_center(
                (center_x, self.rect.top() - EQUIP_ICON_LIFT_PX),
                equipped.icon.width,
                equipped.icon.height,
            );
            equipped.icon.draw(canvas, icon_rect, PICKUP_PLACEHOLDER_COLOR);

            if let Some(remaining) = self.cooldown_remaining(now) {
                canvas.draw_text(
                    &format!("{remaining:.1}s"),
                    font,
                    WHITE,
                    TextAnchor::MidTop,
                    self.rect.mid_bottom(),
                );
            }
        }

        let Some(prompt) = self.prompt else {
            return;
        };
        let anchor = match prompt {
            InteractionPrompt::Unequip => Some((self.rect.center().0, self.rect.top() - PROMPT_LIFT_PX)),
            InteractionPrompt::Equip { target } => pickups
                .iter()
                .find(|pickup| pickup.id == target)
                .map(|pickup| pickup.rect.mid_top()),
        };
        if let Some(point) = anchor {
            canvas.draw_text(prompt.text(), font, WHITE, TextAnchor::MidBottom, point);
        }
    }
}
