#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenePhase {
    Inactive,
    Playing,
    Victory,
    Defeat,
}

impl ScenePhase {
    fn is_finished(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Playing => "playing",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
        }
    }
}

#[derive(Debug, Error)]
enum LevelLoadError {
    #[error("level {number} is not defined")]
    UnknownLevel { number: u32 },
    #[error("level {number} walkable mask '{key}' is not loaded")]
    MissingWalkableMask { number: u32, key: String },
}

/// Traversable pixels of a level. Anything outside the mask is blocked.
#[derive(Debug, Clone)]
struct WalkabilityMask {
    mask: BitMask,
}

impl WalkabilityMask {
    fn from_bitmap(bitmap: &Bitmap) -> Self {
        Self {
            mask: BitMask::from_alpha(bitmap),
        }
    }

    #[cfg(test)]
    fn from_mask(mask: BitMask) -> Self {
        Self { mask }
    }

    fn is_walkable(&self, point: (i32, i32)) -> bool {
        self.mask.get(point.0, point.1)
    }
}

/// A picture plus the opaque-pixel mask used for hit tests. Without an image the
/// whole rectangle counts as opaque and renders as a placeholder block.
#[derive(Debug, Clone)]
struct Sprite {
    image: Option<Arc<Bitmap>>,
    mask: Arc<BitMask>,
    width: i32,
    height: i32,
}

impl Sprite {
    fn from_image(image: Option<Arc<Bitmap>>, size: SizePx) -> Self {
        let (width, height) = size;
        match image {
            Some(source) => {
                let scaled = if source.width() == width && source.height() == height {
                    source
                } else {
                    Arc::new(source.scaled(width, height))
                };
                let mask = Arc::new(BitMask::from_alpha(&scaled));
                Self {
                    image: Some(scaled),
                    mask,
                    width: width as i32,
                    height: height as i32,
                }
            }
            None => Self::solid(size),
        }
    }

    fn solid(size: SizePx) -> Self {
        Self {
            image: None,
            mask: Arc::new(BitMask::filled(size.0, size.1)),
            width: size.0 as i32,
            height: size.1 as i32,
        }
    }

    fn draw(&self, canvas: &mut Canvas, rect: Rect, placeholder: Color) {
        match &self.image {
            Some(image) => canvas.blit(image, rect.top_left()),
            None => canvas.fill_rect(rect, placeholder),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PickupId(u32);

/// A weapon lying in the level, waiting to be equipped.
#[derive(Debug, Clone)]
struct WeaponPickup {
    id: PickupId,
    weapon: WeaponDef,
    rect: Rect,
    sprite: Sprite,
    projectile_sprite: Sprite,
}

impl WeaponPickup {
    fn build(
        id: PickupId,
        spawn: &WeaponSpawnDef,
        defs: &DefDatabase,
        assets: &AssetStore,
    ) -> Option<Self> {
        let Some(weapon) = defs.weapon(&spawn.weapon) else {
            warn!(
                weapon = %spawn.weapon,
                x = spawn.at.0,
                y = spawn.at.1,
                "weapon_pickup_unknown_type"
            );
            return None;
        };
        let sprite = Sprite::from_image(assets.image(&weapon.image), weapon.size);
        let projectile_sprite = Sprite::from_image(
            assets.image(&weapon.projectile_image),
            weapon.projectile_size,
        );
        Some(Self {
            id,
            weapon: weapon.clone(),
            rect: Rect::from_center(spawn.at, sprite.width, sprite.height),
            sprite,
            projectile_sprite,
        })
    }
}

/// Data copied off a pickup when it is equipped; the pickup itself leaves the world.
#[derive(Debug, Clone)]
struct EquippedWeapon {
    weapon: WeaponDef,
    icon: Sprite,
    projectile_sprite: Sprite,
}

impl EquippedWeapon {
    fn cooldown(&self) -> Duration {
        seconds_to_duration(self.weapon.cooldown_seconds)
    }
}

/// Never panics: negative or NaN seconds become zero, overlong spans are capped.
fn seconds_to_duration(seconds: f32) -> Duration {
    match Duration::try_from_secs_f32(seconds) {
        Ok(duration) => duration.min(LONGEST_TIME_SPAN),
        Err(_) if seconds > 0.0 => LONGEST_TIME_SPAN,
        Err(_) => Duration::ZERO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InteractionPrompt {
    Equip { target: PickupId },
    Unequip,
}

impl InteractionPrompt {
    fn text(self) -> &'static str {
        match self {
            Self::Equip { .. } => EQUIP_PROMPT_TEXT,
            Self::Unequip => UNEQUIP_PROMPT_TEXT,
        }
    }
}

#[derive(Debug, Clone)]
struct Projectile {
    /// Center in frame pixels.
    position: Vec2,
    /// Pixels per tick.
    velocity: Vec2,
    damage: i32,
    sprite: Sprite,
}

impl Projectile {
    fn fired(from: Vec2, toward: Vec2, equipped: &EquippedWeapon) -> Self {
        let direction = (toward - from)
            .normalized()
            .unwrap_or(DEFAULT_PROJECTILE_DIRECTION);
        Self {
            position: from,
            velocity: direction * equipped.weapon.projectile_speed,
            damage: equipped.weapon.damage,
            sprite: equipped.projectile_sprite.clone(),
        }
    }

    fn rect(&self) -> Rect {
        Rect::from_center(self.position.rounded_px(), self.sprite.width, self.sprite.height)
    }

    fn advance(&mut self) {
        self.position += self.velocity;
    }
}

#[derive(Debug, Clone)]
struct Enemy {
    def_name: String,
    /// Center in frame pixels.
    position: Vec2,
    /// Pixels per tick.
    velocity: Vec2,
    health: i32,
    sprite: Sprite,
}

impl Enemy {
    fn rect(&self) -> Rect {
        Rect::from_center(self.position.rounded_px(), self.sprite.width, self.sprite.height)
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }
}
