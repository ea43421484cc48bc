use std::collections::BTreeSet;

use crate::maze::Maze;
use crate::types::{Direction, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    SameCell,
    /// One cell apart and each heading straight into the other.
    HeadOn,
}

/// Contact test for one player/adversary pair. Adjacency honours the
/// horizontal wrap, so a swap across the tunnel edge is still caught.
pub fn detect_contact(
    maze: &Maze,
    player: Vec2,
    player_dir: Direction,
    adversary: Vec2,
    adversary_dir: Direction,
) -> Option<Contact> {
    if player == adversary {
        return Some(Contact::SameCell);
    }
    let adversary_faces_player = maze.neighbor(adversary, adversary_dir) == Some(player);
    let player_faces_adversary = maze.neighbor(player, player_dir) == Some(adversary);
    if adversary_faces_player && player_faces_adversary {
        Some(Contact::HeadOn)
    } else {
        None
    }
}

/// Cells within Manhattan `radius` of the player, excluding the player's own cell.
pub fn protected_cells(maze: &Maze, player: Vec2, radius: i32) -> BTreeSet<Vec2> {
    let mut cells = BTreeSet::new();
    if radius <= 0 {
        return cells;
    }
    let radius = radius.min(maze.reach_radius());
    for dy in -radius..=radius {
        let span = radius - dy.abs();
        for dx in -span..=span {
            if dx == 0 && dy == 0 {
                continue;
            }
            if let Some(cell) = maze.wrap(Vec2::new(player.x + dx, player.y + dy)) {
                if cell != player {
                    cells.insert(cell);
                }
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane() -> Maze {
        Maze::from_rows(&["00000", "00000", "00000"]).expect("valid maze")
    }

    #[test]
    fn same_cell_ignores_headings() {
        let maze = lane();
        assert_eq!(
            detect_contact(&maze, Vec2::new(2, 1), Direction::None, Vec2::new(2, 1), Direction::Up),
            Some(Contact::SameCell)
        );
    }

    #[test]
    fn head_on_requires_both_entities_to_face_each_other() {
        let maze = lane();
        let player = Vec2::new(1, 1);
        let adversary = Vec2::new(2, 1);
        assert_eq!(
            detect_contact(&maze, player, Direction::Right, adversary, Direction::Left),
            Some(Contact::HeadOn)
        );
        assert_eq!(
            detect_contact(&maze, player, Direction::Right, adversary, Direction::Right),
            None
        );
        assert_eq!(
            detect_contact(&maze, player, Direction::Up, adversary, Direction::Left),
            None
        );
        assert_eq!(
            detect_contact(&maze, player, Direction::Right, Vec2::new(3, 1), Direction::Left),
            None
        );
    }

    #[test]
    fn head_on_is_detected_across_the_wrap_edge() {
        let maze = lane();
        assert_eq!(
            detect_contact(&maze, Vec2::new(0, 0), Direction::Left, Vec2::new(4, 0), Direction::Right),
            Some(Contact::HeadOn)
        );
    }

    #[test]
    fn protection_never_covers_the_player_cell() {
        let maze = lane();
        let player = Vec2::new(2, 1);
        let cells = protected_cells(&maze, player, 1);
        assert_eq!(cells.len(), 4);
        assert!(!cells.contains(&player));
        assert!(cells.contains(&Vec2::new(2, 0)));
        assert!(protected_cells(&maze, player, 0).is_empty());
    }

    #[test]
    fn oversized_protection_covers_the_whole_maze_once() {
        let maze = lane();
        let player = Vec2::new(2, 1);
        let cells = protected_cells(&maze, player, i32::MAX);
        assert_eq!(cells.len(), maze.open_cells().count() - 1);
        assert!(!cells.contains(&player));
    }

    #[test]
    fn protection_clips_vertically_and_wraps_horizontally() {
        let maze = lane();
        let cells = protected_cells(&maze, Vec2::new(0, 0), 1);
        assert!(cells.contains(&Vec2::new(4, 0)));
        assert!(cells.contains(&Vec2::new(1, 0)));
        assert!(cells.contains(&Vec2::new(0, 1)));
        assert_eq!(cells.len(), 3);
    }
}
