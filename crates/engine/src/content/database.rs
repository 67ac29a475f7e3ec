use std::collections::{BTreeMap, BTreeSet};

/// Pixel size as `(width, height)`.
pub type SizePx = (u32, u32);

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDef {
    pub def_name: String,
    pub image: String,
    pub size: SizePx,
    pub cooldown_seconds: f32,
    pub damage: i32,
    pub projectile_image: String,
    pub projectile_size: SizePx,
    /// Pixels per tick.
    pub projectile_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonsterDef {
    pub def_name: String,
    pub image: String,
    pub size: SizePx,
    pub health: i32,
    /// Pixels per tick.
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponSpawnDef {
    /// Not validated against the weapon table; unknown names fail when the pickup is built.
    pub weapon: String,
    pub at: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonsterSpawnDef {
    pub monster: String,
    pub at: (i32, i32),
    pub heading: (f32, f32),
    pub every_seconds: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub number: u32,
    pub def_name: String,
    pub label: Option<String>,
    pub background: String,
    pub walkable_mask: String,
    /// Player mid-bottom at level start.
    pub spawn_point: (i32, i32),
    pub player_size: SizePx,
    pub foot_offset: (i32, i32),
    pub duration_seconds: f32,
    pub victory_monster_limit: u32,
    pub weapon_spawns: Vec<WeaponSpawnDef>,
    pub monster_spawns: Vec<MonsterSpawnDef>,
}

impl LevelDef {
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.def_name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DefDatabase {
    weapons: BTreeMap<String, WeaponDef>,
    monsters: BTreeMap<String, MonsterDef>,
    levels: BTreeMap<u32, LevelDef>,
}

impl DefDatabase {
    pub fn from_defs(
        weapons: Vec<WeaponDef>,
        monsters: Vec<MonsterDef>,
        levels: Vec<LevelDef>,
    ) -> Self {
        Self {
            weapons: weapons
                .into_iter()
                .map(|def| (def.def_name.clone(), def))
                .collect(),
            monsters: monsters
                .into_iter()
                .map(|def| (def.def_name.clone(), def))
                .collect(),
            levels: levels.into_iter().map(|def| (def.number, def)).collect(),
        }
    }

    pub fn weapon(&self, def_name: &str) -> Option<&WeaponDef> {
        self.weapons.get(def_name)
    }

    pub fn weapons(&self) -> impl Iterator<Item = &WeaponDef> {
        self.weapons.values()
    }

    pub fn monster(&self, def_name: &str) -> Option<&MonsterDef> {
        self.monsters.get(def_name)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &MonsterDef> {
        self.monsters.values()
    }

    pub fn level(&self, number: u32) -> Option<&LevelDef> {
        self.levels.get(&number)
    }

    /// Levels in ascending number order.
    pub fn levels(&self) -> impl Iterator<Item = &LevelDef> {
        self.levels.values()
    }

    /// Every image key any definition refers to, deduplicated and sorted.
    pub fn image_keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        for weapon in self.weapons.values() {
            keys.insert(weapon.image.clone());
            keys.insert(weapon.projectile_image.clone());
        }
        for monster in self.monsters.values() {
            keys.insert(monster.image.clone());
        }
        for level in self.levels.values() {
            keys.insert(level.background.clone());
            keys.insert(level.walkable_mask.clone());
        }
        keys.into_iter().collect()
    }
}
