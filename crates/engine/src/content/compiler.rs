use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use super::database::{
    DefDatabase, LevelDef, MonsterDef, MonsterSpawnDef, SizePx, WeaponDef, WeaponSpawnDef,
};
use super::discovery::collect_xml_files_sorted;

const DEFAULT_LEVEL_DURATION_SECONDS: f32 = 60.0;
const DEFAULT_VICTORY_MONSTER_LIMIT: u32 = 20;
/// Upper bound for every time field (cooldowns, level duration, spawn intervals).
const MAX_SECONDS: f32 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDef,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

enum ParsedDef {
    Weapon(WeaponDef),
    Monster(MonsterDef),
    Level(LevelDef, Vec<MonsterRef>),
}

/// A level's reference to a monster def, kept with its position for late validation.
struct MonsterRef {
    monster: String,
    location: SourceLocation,
}

struct Located<T> {
    def: T,
    file_path: PathBuf,
    location: SourceLocation,
}

/// Compiles every `*.xml` file under `defs_dir` into one database.
pub fn compile_def_database(defs_dir: &Path) -> Result<DefDatabase, ContentCompileError> {
    let xml_files = collect_xml_files_sorted(defs_dir)
        .map_err(|error| read_error(error.path, error.source))?;

    let mut weapons = BTreeMap::<String, Located<WeaponDef>>::new();
    let mut monsters = BTreeMap::<String, Located<MonsterDef>>::new();
    let mut levels = BTreeMap::<u32, Located<(LevelDef, Vec<MonsterRef>)>>::new();

    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file)
            .map_err(|source| read_error(xml_file.clone(), source))?;
        let parsed = parse_defs_document(&xml_file, &raw)?;
        for (def, location) in parsed {
            match def {
                ParsedDef::Weapon(def) => {
                    ensure_unique(&weapons, &def.def_name, "WeaponDef", &xml_file, location)?;
                    weapons.insert(
                        def.def_name.clone(),
                        Located {
                            def,
                            file_path: xml_file.clone(),
                            location,
                        },
                    );
                }
                ParsedDef::Monster(def) => {
                    ensure_unique(&monsters, &def.def_name, "MonsterDef", &xml_file, location)?;
                    monsters.insert(
                        def.def_name.clone(),
                        Located {
                            def,
                            file_path: xml_file.clone(),
                            location,
                        },
                    );
                }
                ParsedDef::Level(def, refs) => {
                    ensure_unique(&levels, &def.number, "LevelDef number", &xml_file, location)?;
                    levels.insert(
                        def.number,
                        Located {
                            def: (def, refs),
                            file_path: xml_file.clone(),
                            location,
                        },
                    );
                }
            }
        }
    }

    for level in levels.values() {
        for monster_ref in &level.def.1 {
            if !monsters.contains_key(&monster_ref.monster) {
                return Err(ContentCompileError {
                    code: ContentErrorCode::InvalidValue,
                    message: format!(
                        "level '{}' spawns unknown monster '{}'",
                        level.def.0.def_name, monster_ref.monster
                    ),
                    file_path: level.file_path.clone(),
                    location: Some(monster_ref.location),
                });
            }
        }
    }

    Ok(DefDatabase::from_defs(
        weapons.into_values().map(|located| located.def).collect(),
        monsters.into_values().map(|located| located.def).collect(),
        levels.into_values().map(|located| located.def.0).collect(),
    ))
}

fn ensure_unique<K: Ord + fmt::Display, T>(
    existing: &BTreeMap<K, Located<T>>,
    key: &K,
    kind: &str,
    file_path: &Path,
    location: SourceLocation,
) -> Result<(), ContentCompileError> {
    let Some(previous) = existing.get(key) else {
        return Ok(());
    };
    Err(ContentCompileError {
        code: ContentErrorCode::DuplicateDef,
        message: format!(
            "duplicate {kind} '{key}'; first defined in {} at line {}",
            previous.file_path.display(),
            previous.location.line
        ),
        file_path: file_path.to_path_buf(),
        location: Some(location),
    })
}

/// Parsing context for one XML file.
struct DefFile<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl<'a, 'input> DefFile<'a, 'input> {
    fn location(&self, node: Node<'_, '_>) -> SourceLocation {
        let pos = self.doc.text_pos_at(node.range().start);
        SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }
    }

    fn error_at(&self, code: ContentErrorCode, message: String, node: Node<'_, '_>) -> ContentCompileError {
        ContentCompileError {
            code,
            message,
            file_path: self.file_path.to_path_buf(),
            location: Some(self.location(node)),
        }
    }

    fn required_text(&self, node: Node<'_, '_>, field_name: &str) -> Result<String, ContentCompileError> {
        let value = node.text().map(str::trim).unwrap_or_default().to_string();
        if value.is_empty() {
            return Err(self.error_at(
                ContentErrorCode::MissingField,
                format!("field <{}> must not be empty", field_name),
                node,
            ));
        }
        Ok(value)
    }

    fn required_attr(&self, node: Node<'_, '_>, attr: &str) -> Result<String, ContentCompileError> {
        match node.attribute(attr).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(self.error_at(
                ContentErrorCode::MissingField,
                format!("<{}> requires attribute '{}'", node.tag_name().name(), attr),
                node,
            )),
        }
    }

    fn number<T: FromStr>(&self, node: Node<'_, '_>, field_name: &str, raw: &str) -> Result<T, ContentCompileError> {
        raw.parse::<T>().map_err(|_| {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} '{}' is not a valid number", field_name, raw),
                node,
            )
        })
    }

    fn pair<T: FromStr + Copy>(
        &self,
        node: Node<'_, '_>,
        field_name: &str,
        raw: &str,
    ) -> Result<(T, T), ContentCompileError> {
        let invalid = || {
            self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} '{}' must be two comma-separated numbers", field_name, raw),
                node,
            )
        };
        let mut parts = raw.split(',').map(str::trim);
        let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let first = first.parse::<T>().map_err(|_| invalid())?;
        let second = second.parse::<T>().map_err(|_| invalid())?;
        Ok((first, second))
    }

    fn text_number<T: FromStr>(&self, node: Node<'_, '_>, field_name: &str) -> Result<T, ContentCompileError> {
        let raw = self.required_text(node, field_name)?;
        self.number(node, field_name, &raw)
    }

    fn text_size(&self, node: Node<'_, '_>, field_name: &str) -> Result<SizePx, ContentCompileError> {
        let raw = self.required_text(node, field_name)?;
        let size = self.pair::<u32>(node, field_name, &raw)?;
        if size.0 == 0 || size.1 == 0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} must be at least 1x1", field_name),
                node,
            ));
        }
        Ok(size)
    }

    fn text_point(&self, node: Node<'_, '_>, field_name: &str) -> Result<(i32, i32), ContentCompileError> {
        let raw = self.required_text(node, field_name)?;
        self.pair::<i32>(node, field_name, &raw)
    }

    fn positive_f32(&self, node: Node<'_, '_>, field_name: &str, allow_zero: bool) -> Result<f32, ContentCompileError> {
        let value = self.text_number::<f32>(node, field_name)?;
        let in_range = if allow_zero { value >= 0.0 } else { value > 0.0 };
        if !value.is_finite() || !in_range {
            let bound = if allow_zero { ">= 0" } else { "> 0" };
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} must be finite and {}", field_name, bound),
                node,
            ));
        }
        Ok(value)
    }

    fn seconds(&self, node: Node<'_, '_>, field_name: &str, value: f32, allow_zero: bool) -> Result<f32, ContentCompileError> {
        let in_range = if allow_zero { value >= 0.0 } else { value > 0.0 };
        if !value.is_finite() || !in_range || value > MAX_SECONDS {
            let bound = if allow_zero { ">= 0" } else { "> 0" };
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} must be {} and at most {} seconds", field_name, bound, MAX_SECONDS),
                node,
            ));
        }
        Ok(value)
    }

    fn text_seconds(&self, node: Node<'_, '_>, field_name: &str, allow_zero: bool) -> Result<f32, ContentCompileError> {
        let value = self.text_number::<f32>(node, field_name)?;
        self.seconds(node, field_name, value, allow_zero)
    }

    fn positive_i32(&self, node: Node<'_, '_>, field_name: &str) -> Result<i32, ContentCompileError> {
        let value = self.text_number::<i32>(node, field_name)?;
        if value <= 0 {
            return Err(self.error_at(
                ContentErrorCode::InvalidValue,
                format!("{} must be > 0", field_name),
                node,
            ));
        }
        Ok(value)
    }

    fn missing<T>(&self, value: Option<T>, def_type: &str, field_name: &str, node: Node<'_, '_>) -> Result<T, ContentCompileError> {
        value.ok_or_else(|| {
            self.error_at(
                ContentErrorCode::MissingField,
                format!("missing required field <{}> in <{}>", field_name, def_type),
                node,
            )
        })
    }

    /// Element children, rejecting repeats of the same tag.
    fn unique_fields<'n>(
        &self,
        node: Node<'n, 'input>,
        def_type: &str,
    ) -> Result<Vec<Node<'n, 'input>>, ContentCompileError> {
        let mut seen_fields = HashSet::<&str>::new();
        let mut fields = Vec::new();
        for field in node.children().filter(|child| child.is_element()) {
            if !seen_fields.insert(field.tag_name().name()) {
                return Err(self.error_at(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{}> in <{}>", field.tag_name().name(), def_type),
                    field,
                ));
            }
            fields.push(field);
        }
        Ok(fields)
    }

    fn unknown_field(&self, field: Node<'_, '_>, def_type: &str) -> ContentCompileError {
        self.error_at(
            ContentErrorCode::UnknownField,
            format!("unknown field <{}> in <{}>", field.tag_name().name(), def_type),
            field,
        )
    }
}

fn parse_defs_document(
    file_path: &Path,
    raw: &str,
) -> Result<Vec<(ParsedDef, SourceLocation)>, ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;
    let file = DefFile {
        file_path,
        doc: &doc,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(file.error_at(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    let mut defs = Vec::new();
    for child in root.children().filter(|node| node.is_element()) {
        let parsed = match child.tag_name().name() {
            "WeaponDef" => ParsedDef::Weapon(parse_weapon_def(&file, child)?),
            "MonsterDef" => ParsedDef::Monster(parse_monster_def(&file, child)?),
            "LevelDef" => {
                let (level, refs) = parse_level_def(&file, child)?;
                ParsedDef::Level(level, refs)
            }
            other => {
                return Err(file.error_at(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{}>; expected <WeaponDef>, <MonsterDef> or <LevelDef>",
                        other
                    ),
                    child,
                ))
            }
        };
        defs.push((parsed, file.location(child)));
    }

    Ok(defs)
}

fn parse_weapon_def<'input>(
    file: &DefFile<'_, 'input>,
    node: Node<'_, 'input>,
) -> Result<WeaponDef, ContentCompileError> {
    const DEF: &str = "WeaponDef";
    let mut def_name = None;
    let mut image = None;
    let mut size = None;
    let mut cooldown_seconds = None;
    let mut damage = None;
    let mut projectile_image = None;
    let mut projectile_size = None;
    let mut projectile_speed = None;

    for field in file.unique_fields(node, DEF)? {
        match field.tag_name().name() {
            "defName" => def_name = Some(file.required_text(field, "defName")?),
            "image" => image = Some(file.required_text(field, "image")?),
            "size" => size = Some(file.text_size(field, "size")?),
            "cooldown" => cooldown_seconds = Some(file.text_seconds(field, "cooldown", true)?),
            "damage" => damage = Some(file.positive_i32(field, "damage")?),
            "projectileImage" => {
                projectile_image = Some(file.required_text(field, "projectileImage")?)
            }
            "projectileSize" => projectile_size = Some(file.text_size(field, "projectileSize")?),
            "projectileSpeed" => {
                projectile_speed = Some(file.positive_f32(field, "projectileSpeed", false)?)
            }
            _ => return Err(file.unknown_field(field, DEF)),
        }
    }

    Ok(WeaponDef {
        def_name: file.missing(def_name, DEF, "defName", node)?,
        image: file.missing(image, DEF, "image", node)?,
        size: file.missing(size, DEF, "size", node)?,
        cooldown_seconds: file.missing(cooldown_seconds, DEF, "cooldown", node)?,
        damage: file.missing(damage, DEF, "damage", node)?,
        projectile_image: file.missing(projectile_image, DEF, "projectileImage", node)?,
        projectile_size: file.missing(projectile_size, DEF, "projectileSize", node)?,
        projectile_speed: file.missing(projectile_speed, DEF, "projectileSpeed", node)?,
    })
}

fn parse_monster_def<'input>(
    file: &DefFile<'_, 'input>,
    node: Node<'_, 'input>,
) -> Result<MonsterDef, ContentCompileError> {
    const DEF: &str = "MonsterDef";
    let mut def_name = None;
    let mut image = None;
    let mut size = None;
    let mut health = None;
    let mut speed = None;

    for field in file.unique_fields(node, DEF)? {
        match field.tag_name().name() {
            "defName" => def_name = Some(file.required_text(field, "defName")?),
            "image" => image = Some(file.required_text(field, "image")?),
            "size" => size = Some(file.text_size(field, "size")?),
            "health" => health = Some(file.positive_i32(field, "health")?),
            "speed" => speed = Some(file.positive_f32(field, "speed", true)?),
            _ => return Err(file.unknown_field(field, DEF)),
        }
    }

    Ok(MonsterDef {
        def_name: file.missing(def_name, DEF, "defName", node)?,
        image: file.missing(image, DEF, "image", node)?,
        size: file.missing(size, DEF, "size", node)?,
        health: file.missing(health, DEF, "health", node)?,
        speed: file.missing(speed, DEF, "speed", node)?,
    })
}

fn parse_level_def<'input>(
    file: &DefFile<'_, 'input>,
    node: Node<'_, 'input>,
) -> Result<(LevelDef, Vec<MonsterRef>), ContentCompileError> {
    const DEF: &str = "LevelDef";
    let mut number = None;
    let mut def_name = None;
    let mut label = None;
    let mut background = None;
    let mut walkable_mask = None;
    let mut spawn_point = None;
    let mut player_size = None;
    let mut foot_offset = None;
    let mut duration_seconds = None;
    let mut victory_monster_limit = None;
    let mut weapon_spawns = Vec::new();
    let mut monster_spawns = Vec::new();
    let mut monster_refs = Vec::new();

    for field in file.unique_fields(node, DEF)? {
        match field.tag_name().name() {
            "number" => {
                let value = file.text_number::<u32>(field, "number")?;
                if value == 0 {
                    return Err(file.error_at(
                        ContentErrorCode::InvalidValue,
                        "number must be >= 1".to_string(),
                        field,
                    ));
                }
                number = Some(value);
            }
            "defName" => def_name = Some(file.required_text(field, "defName")?),
            "label" => label = Some(file.required_text(field, "label")?),
            "background" => background = Some(file.required_text(field, "background")?),
            "walkableMask" => walkable_mask = Some(file.required_text(field, "walkableMask")?),
            "spawnPoint" => spawn_point = Some(file.text_point(field, "spawnPoint")?),
            "playerSize" => player_size = Some(file.text_size(field, "playerSize")?),
            "footOffset" => foot_offset = Some(file.text_point(field, "footOffset")?),
            "duration" => duration_seconds = Some(file.text_seconds(field, "duration", false)?),
            "victoryMonsterLimit" => {
                victory_monster_limit = Some(file.text_number::<u32>(field, "victoryMonsterLimit")?)
            }
            "weaponSpawns" => {
                for spawn in spawn_entries(file, field)? {
                    let at = file.required_attr(spawn, "at")?;
                    weapon_spawns.push(WeaponSpawnDef {
                        weapon: file.required_attr(spawn, "weapon")?,
                        at: file.pair::<i32>(spawn, "at", &at)?,
                    });
                }
            }
            "monsterSpawns" => {
                for spawn in spawn_entries(file, field)? {
                    let monster = file.required_attr(spawn, "monster")?;
                    let at = file.required_attr(spawn, "at")?;
                    let heading = file.required_attr(spawn, "heading")?;
                    let every = file.required_attr(spawn, "every")?;
                    let every_seconds =
                        file.seconds(spawn, "every", file.number::<f32>(spawn, "every", &every)?, false)?;
                    monster_refs.push(MonsterRef {
                        monster: monster.clone(),
                        location: file.location(spawn),
                    });
                    monster_spawns.push(MonsterSpawnDef {
                        monster,
                        at: file.pair::<i32>(spawn, "at", &at)?,
                        heading: file.pair::<f32>(spawn, "heading", &heading)?,
                        every_seconds,
                    });
                }
            }
            _ => return Err(file.unknown_field(field, DEF)),
        }
    }

    let level = LevelDef {
        number: file.missing(number, DEF, "number", node)?,
        def_name: file.missing(def_name, DEF, "defName", node)?,
        label,
        background: file.missing(background, DEF, "background", node)?,
        walkable_mask: file.missing(walkable_mask, DEF, "walkableMask", node)?,
        spawn_point: file.missing(spawn_point, DEF, "spawnPoint", node)?,
        player_size: file.missing(player_size, DEF, "playerSize", node)?,
        foot_offset: foot_offset.unwrap_or((0, 0)),
        duration_seconds: duration_seconds.unwrap_or(DEFAULT_LEVEL_DURATION_SECONDS),
        victory_monster_limit: victory_monster_limit.unwrap_or(DEFAULT_VICTORY_MONSTER_LIMIT),
        weapon_spawns,
        monster_spawns,
    };
    Ok((level, monster_refs))
}

fn spawn_entries<'n, 'input>(
    file: &DefFile<'_, 'input>,
    list: Node<'n, 'input>,
) -> Result<Vec<Node<'n, 'input>>, ContentCompileError> {
    let mut entries = Vec::new();
    for child in list.children().filter(|child| child.is_element()) {
        if child.tag_name().name() != "spawn" {
            return Err(file.error_at(
                ContentErrorCode::UnknownField,
                format!(
                    "unexpected <{}> in <{}>; expected <spawn>",
                    child.tag_name().name(),
                    list.tag_name().name()
                ),
                child,
            ));
        }
        entries.push(child);
    }
    Ok(entries)
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        file_path: path,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const WEAPON: &str = r#"<WeaponDef>
        <defName>harpoon</defName><image>weapons/harpoon</image><size>40,20</size>
        <cooldown>0.5</cooldown><damage>3</damage><projectileImage>projectiles/bolt</projectileImage>
        <projectileSize>8,8</projectileSize><projectileSpeed>12</projectileSpeed>
    </WeaponDef>"#;
    const MONSTER: &str = r#"<MonsterDef>
        <defName>gull</defName><image>monsters/gull</image><size>48,48</size>
        <health>5</health><speed>2</speed>
    </MonsterDef>"#;

    fn level(number: u32, extra: &str) -> String {
        format!(
            r#"<LevelDef>
                <number>{number}</number><defName>level_{number}</defName>
                <background>levels/bg</background><walkableMask>levels/mask</walkableMask>
                <spawnPoint>100,400</spawnPoint><playerSize>60,90</playerSize>{extra}
            </LevelDef>"#
        )
    }

    fn write_defs(dir: &Path, name: &str, body: &str) {
        fs::create_dir_all(dir).expect("mkdir");
        fs::write(dir.join(name), format!("<Defs>{body}</Defs>")).expect("write");
    }

    fn compile_body(body: &str) -> Result<DefDatabase, ContentCompileError> {
        let temp = TempDir::new().expect("temp");
        write_defs(temp.path(), "defs.xml", body);
        compile_def_database(temp.path())
    }

    #[test]
    fn valid_defs_compile_with_level_defaults() {
        let body = format!(
            "{WEAPON}{MONSTER}{}",
            level(
                1,
                r#"<footOffset>12,0</footOffset>
                <weaponSpawns><spawn weapon="harpoon" at="300,420"/><spawn weapon="cannon" at="10,10"/></weaponSpawns>
                <monsterSpawns><spawn monster="gull" at="0,200" heading="1,0" every="2.5"/></monsterSpawns>"#
            )
        );
        let db = compile_body(&body).expect("compile");

        let weapon = db.weapon("harpoon").expect("weapon");
        assert_eq!(weapon.size, (40, 20));
        assert_eq!(weapon.damage, 3);
        assert!((weapon.cooldown_seconds - 0.5).abs() < f32::EPSILON);

        let level = db.level(1).expect("level");
        assert_eq!(level.display_name(), "level_1");
        assert_eq!(level.spawn_point, (100, 400));
        assert_eq!(level.foot_offset, (12, 0));
        assert!((level.duration_seconds - 60.0).abs() < f32::EPSILON);
        assert_eq!(level.victory_monster_limit, 20);
        assert_eq!(level.weapon_spawns.len(), 2);
        assert_eq!(level.weapon_spawns[1].weapon, "cannon");
        assert_eq!(level.monster_spawns[0].heading, (1.0, 0.0));
        assert_eq!(
            db.image_keys(),
            vec![
                "levels/bg",
                "levels/mask",
                "monsters/gull",
                "projectiles/bolt",
                "weapons/harpoon"
            ]
        );
    }

    #[test]
    fn levels_iterate_by_number_across_files() {
        let temp = TempDir::new().expect("temp");
        write_defs(temp.path(), "a.xml", &level(2, ""));
        write_defs(&temp.path().join("more"), "b.xml", &level(1, "<label>Harbor</label>"));
        let db = compile_def_database(temp.path()).expect("compile");

        let numbers: Vec<u32> = db.levels().map(|level| level.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(db.level(1).map(LevelDef::display_name), Some("Harbor"));
    }

    #[test]
    fn missing_field_reports_file_and_location() {
        let err = compile_body("<MonsterDef><defName>x</defName></MonsterDef>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingField);
        assert!(err.file_path.ends_with("defs.xml"));
        assert_eq!(err.location.map(|loc| loc.line), Some(1));
    }

    #[test]
    fn unknown_field_and_def_type_error() {
        let err = compile_body(&WEAPON.replace("<damage>3</damage>", "<damage>3</damage><mood>x</mood>"))
            .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownField);

        let err = compile_body("<ShipDef/>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownDefType);
    }

    #[test]
    fn duplicate_field_errors() {
        let err = compile_body(&MONSTER.replace("<speed>2</speed>", "<speed>2</speed><speed>3</speed>"))
            .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateField);
    }

    #[test]
    fn invalid_values_error() {
        for (from, to) in [
            ("<damage>3</damage>", "<damage>0</damage>"),
            ("<cooldown>0.5</cooldown>", "<cooldown>-1</cooldown>"),
            ("<size>40,20</size>", "<size>40</size>"),
            ("<size>40,20</size>", "<size>0,20</size>"),
            ("<projectileSpeed>12</projectileSpeed>", "<projectileSpeed>fast</projectileSpeed>"),
        ] {
            let err = compile_body(&WEAPON.replace(from, to)).expect_err("err");
            assert_eq!(err.code, ContentErrorCode::InvalidValue, "case={to}");
        }
    }

    #[test]
    fn oversized_time_fields_error() {
        let err = compile_body(&level(1, "<duration>1e30</duration>")).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
        assert!(err.message.contains("duration"), "{}", err.message);

        let err = compile_body(&WEAPON.replace("<cooldown>0.5</cooldown>", "<cooldown>1e20</cooldown>"))
            .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);

        let spawns = r#"<monsterSpawns><spawn monster="gull" at="0,0" heading="1,0" every="1e30"/></monsterSpawns>"#;
        let err = compile_body(&format!("{MONSTER}{}", level(1, spawns))).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);

        let db = compile_body(&level(1, "<duration>86400</duration>")).expect("compile");
        assert_eq!(db.level(1).map(|level| level.duration_seconds), Some(86_400.0));
    }

    #[test]
    fn duplicate_defs_error_across_files() {
        let temp = TempDir::new().expect("temp");
        write_defs(temp.path(), "a.xml", MONSTER);
        write_defs(temp.path(), "b.xml", MONSTER);
        let err = compile_def_database(temp.path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateDef);
        assert!(err.file_path.ends_with("b.xml"));

        let err = compile_body(&format!("{}{}", level(3, ""), level(3, ""))).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateDef);
    }

    #[test]
    fn unknown_monster_reference_errors_but_weapon_reference_does_not() {
        let body = level(
            1,
            r#"<monsterSpawns><spawn monster="kraken" at="0,0" heading="1,0" every="1"/></monsterSpawns>"#,
        );
        let err = compile_body(&body).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
        assert!(err.message.contains("kraken"));

        let body = level(1, r#"<weaponSpawns><spawn weapon="nope" at="1,1"/></weaponSpawns>"#);
        assert!(compile_body(&body).is_ok());
    }

    #[test]
    fn spawn_lists_only_accept_spawn_entries() {
        let body = level(1, r#"<weaponSpawns><weapon name="x"/></weaponSpawns>"#);
        let err = compile_body(&body).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownField);

        let body = level(1, r#"<weaponSpawns><spawn at="1,1"/></weaponSpawns>"#);
        let err = compile_body(&body).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingField);
    }

    #[test]
    fn malformed_xml_and_bad_root_report_location() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("defs.xml"), "<Defs><LevelDef></Defs>").expect("write");
        let err = compile_def_database(temp.path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::XmlMalformed);
        assert!(err.location.is_some());

        fs::write(temp.path().join("defs.xml"), "<Levels/>").expect("write");
        let err = compile_def_database(temp.path()).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidRoot);
    }

    #[test]
    fn missing_defs_dir_is_read_error() {
        let temp = TempDir::new().expect("temp");
        let err = compile_def_database(&temp.path().join("missing")).expect_err("err");
        assert_eq!(err.code, ContentErrorCode::ReadFile);
        assert!(err.location.is_none());
    }
}
