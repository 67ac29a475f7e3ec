/// A confirmed strike: `projectile` and `enemy` index the slices passed to [`find_hits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hit {
    projectile: usize,
    enemy: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CollisionOutcome {
    projectiles_destroyed: usize,
    enemies_killed: usize,
}

fn bounding_boxes_overlap(projectile: &Projectile, enemy: &Enemy) -> bool {
    projectile.rect().overlaps(&enemy.rect())
}

fn masks_overlap(projectile: &Projectile, enemy: &Enemy) -> bool {
    let enemy_rect = enemy.rect();
    let projectile_rect = projectile.rect();
    let offset = (
        projectile_rect.left() - enemy_rect.left(),
        projectile_rect.top() - enemy_rect.top(),
    );
    enemy.sprite.mask.overlaps(&projectile.sprite.mask, offset)
}

/// Pairs every projectile with at most one enemy. Projectiles are visited in order and
/// each takes the first enemy that passes both the box and the mask test. An enemy that
/// earlier hits in the same pass would already have killed is no longer a target.
fn find_hits(projectiles: &[Projectile], enemies: &[Enemy]) -> Vec<Hit> {
    let mut health: Vec<i32> = enemies.iter().map(|enemy| enemy.health).collect();
    let mut hits = Vec::new();

    for (projectile_index, projectile) in projectiles.iter().enumerate() {
        let struck = enemies.iter().enumerate().find(|(enemy_index, enemy)| {
            health[*enemy_index] > 0
                && bounding_boxes_overlap(projectile, enemy)
                && masks_overlap(projectile, enemy)
        });
        if let Some((enemy_index, _)) = struck {
            health[enemy_index] -= projectile.damage;
            hits.push(Hit {
                projectile: projectile_index,
                enemy: enemy_index,
            });
        }
    }

    hits
}

/// Applies damage for `hits`, then drops the spent projectiles and the dead enemies.
fn apply_hits(
    hits: &[Hit],
    projectiles: &mut Vec<Projectile>,
    enemies: &mut Vec<Enemy>,
) -> CollisionOutcome {
    if hits.is_empty() {
        return CollisionOutcome::default();
    }

    let mut spent = vec![false; projectiles.len()];
    for hit in hits {
        let (Some(projectile), Some(enemy)) = (projectiles.get(hit.projectile), enemies.get_mut(hit.enemy))
        else {
            continue;
        };
        if spent[hit.projectile] {
            continue;
        }
        spent[hit.projectile] = true;
        enemy.health -= projectile.damage;
        if !enemy.is_alive() {
            debug!(monster = %enemy.def_name, "monster_killed");
        }
    }

    let projectiles_before = projectiles.len();
    let mut index = 0;
    projectiles.retain(|_| {
        let keep = !spent[index];
        index += 1;
        keep
    });

    let enemies_before = enemies.len();
    enemies.retain(Enemy::is_alive);

    CollisionOutcome {
        projectiles_destroyed: projectiles_before - projectiles.len(),
        enemies_killed: enemies_before - enemies.len(),
    }
}
