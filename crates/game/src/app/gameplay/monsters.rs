/// Owner of the live enemies. The gameplay scene reads the alive set for collisions and
/// victory accounting, and removes enemies that collisions kill.
trait MonsterManager {
    /// Spawns and moves enemies for one tick at scene time `now`.
    fn update(&mut self, now: Duration);
    fn alive_enemies(&self) -> &[Enemy];
    fn alive_enemies_mut(&mut self) -> &mut Vec<Enemy>;
    /// Enemies that left the level without being destroyed.
    fn escaped_count(&self) -> u32;

    fn draw(&self, canvas: &mut Canvas) {
        for enemy in self.alive_enemies() {
            enemy.sprite.draw(canvas, enemy.rect(), MONSTER_PLACEHOLDER_COLOR);
        }
    }
}

#[derive(Debug, Clone)]
struct MonsterSpawner {
    def_name: String,
    health: i32,
    sprite: Sprite,
    at: Vec2,
    velocity: Vec2,
    every: Duration,
    next_spawn_at: Duration,
}

/// Spawns monsters on fixed timers from a level's spawn list and walks them along their
/// heading until they leave the level.
#[derive(Debug, Clone)]
struct WaveMonsterManager {
    bounds: Rect,
    spawners: Vec<MonsterSpawner>,
    enemies: Vec<Enemy>,
    escaped: u32,
}

impl WaveMonsterManager {
    fn from_level(
        level: &LevelDef,
        defs: &DefDatabase,
        assets: &AssetStore,
        bounds: Rect,
        start: Duration,
    ) -> Self {
        let spawners = level
            .monster_spawns
            .iter()
            .filter_map(|spawn| {
                let Some(monster) = defs.monster(&spawn.monster) else {
                    warn!(monster = %spawn.monster, "monster_spawn_unknown_type");
                    return None;
                };
                let heading = Vec2::new(spawn.heading.0, spawn.heading.1);
                let every = seconds_to_duration(spawn.every_seconds);
                Some(MonsterSpawner {
                    def_name: monster.def_name.clone(),
                    health: monster.health,
                    sprite: Sprite::from_image(assets.image(&monster.image), monster.size),
                    at: Vec2::new(spawn.at.0 as f32, spawn.at.1 as f32),
                    velocity: heading.normalized().unwrap_or(Vec2::ZERO) * monster.speed,
                    every,
                    next_spawn_at: start.saturating_add(every),
                })
            })
            .collect();

        Self {
            bounds,
            spawners,
            enemies: Vec::new(),
            escaped: 0,
        }
    }
}

impl MonsterManager for WaveMonsterManager {
    fn update(&mut self, now: Duration) {
        for spawner in &mut self.spawners {
            while !spawner.every.is_zero() && now >= spawner.next_spawn_at {
                self.enemies.push(Enemy {
                    def_name: spawner.def_name.clone(),
                    position: spawner.at,
                    velocity: spawner.velocity,
                    health: spawner.health,
                    sprite: spawner.sprite.clone(),
                });
                spawner.next_spawn_at = spawner.next_spawn_at.saturating_add(spawner.every);
            }
        }

        for enemy in &mut self.enemies {
            enemy.position += enemy.velocity;
        }

        let bounds = self.bounds;
        let before = self.enemies.len();
        self.enemies.retain(|enemy| enemy.rect().overlaps(&bounds));
        let escaped_now = (before - self.enemies.len()) as u32;
        if escaped_now > 0 {
            self.escaped += escaped_now;
            debug!(escaped_now, escaped_total = self.escaped, "monsters_escaped");
        }
    }

    fn alive_enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    fn alive_enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }

    fn escaped_count(&self) -> u32 {
        self.escaped
    }
}
