//! Breadth-first queries over a [`Maze`] and the one-shot patrol route builder.

use std::collections::VecDeque;

use crate::maze::Maze;
use crate::types::Vec2;

/// A length-optimal path from `start` to `goal`, both endpoints included.
/// Walls are impassable, `x` wraps, `y` does not.
pub fn shortest_path(maze: &Maze, start: Vec2, goal: Vec2) -> Option<Vec<Vec2>> {
    if maze.is_wall(start) || maze.is_wall(goal) {
        return None;
    }
    path_to_nearest(maze, start, |cell| cell == goal)
}

pub fn path_to_nearest<F>(maze: &Maze, start: Vec2, mut is_target: F) -> Option<Vec<Vec2>>
where
    F: FnMut(Vec2) -> bool,
{
    let start_idx = maze.index_of(start)?;
    if maze.is_wall(start) {
        return None;
    }
    if is_target(start) {
        return Some(vec![start]);
    }

    let mut parent: Vec<Option<usize>> = vec![None; maze.cell_count()];
    let mut visited = vec![false; maze.cell_count()];
    let mut queue = VecDeque::new();
    visited[start_idx] = true;
    queue.push_back(start_idx);

    while let Some(current_idx) = queue.pop_front() {
        let current = maze.pos_of(current_idx);
        for (_, next) in maze.open_neighbors(current) {
            let Some(next_idx) = maze.index_of(next) else {
                continue;
            };
            if visited[next_idx] {
                continue;
            }
            visited[next_idx] = true;
            parent[next_idx] = Some(current_idx);
            if is_target(next) {
                return Some(rebuild(maze, &parent, next_idx));
            }
            queue.push_back(next_idx);
        }
    }
    None
}

fn rebuild(maze: &Maze, parent: &[Option<usize>], end_idx: usize) -> Vec<Vec2> {
    let mut out = vec![maze.pos_of(end_idx)];
    let mut cursor = end_idx;
    while let Some(prev) = parent.get(cursor).copied().flatten() {
        out.push(maze.pos_of(prev));
        cursor = prev;
    }
    out.reverse();
    out
}

/// Builds one ordered walk that touches every open cell, used to seed patrol
/// routes. Greedy unvisited-neighbour steps, BFS hops to the nearest
/// unvisited cell when stuck, and a direct jump when the rest of the maze is
/// unreachable. When the last cell can reach the first, the walk is closed
/// so a cycling patrol index never jumps. A maze with no open cells yields
/// a single fallback cell.
pub fn generate_covering_route(maze: &Maze) -> Vec<Vec2> {
    let Some(start) = maze.open_cells().next() else {
        return vec![Vec2::new(0, 0)];
    };
    let total = maze.open_cells().count();
    let mut visited = vec![false; maze.cell_count()];
    let mut visited_count = 0usize;
    let mut route = Vec::with_capacity(total * 2);

    let mark = |cell: Vec2, visited: &mut [bool]| -> bool {
        match maze.index_of(cell) {
            Some(idx) if !visited[idx] => {
                visited[idx] = true;
                true
            }
            _ => false,
        }
    };

    mark(start, &mut visited);
    visited_count += 1;
    route.push(start);
    let mut current = start;

    while visited_count < total {
        let step = maze
            .open_neighbors(current)
            .map(|(_, next)| next)
            .find(|next| maze.index_of(*next).is_some_and(|idx| !visited[idx]));
        if let Some(next) = step {
            mark(next, &mut visited);
            visited_count += 1;
            route.push(next);
            current = next;
            continue;
        }

        let hop = path_to_nearest(maze, current, |cell| {
            maze.index_of(cell).is_some_and(|idx| !visited[idx])
        });
        match hop {
            Some(path) => {
                for cell in path.into_iter().skip(1) {
                    if mark(cell, &mut visited) {
                        visited_count += 1;
                    }
                    route.push(cell);
                    current = cell;
                }
            }
            None => {
                let jump = maze
                    .open_cells()
                    .find(|cell| maze.index_of(*cell).is_some_and(|idx| !visited[idx]));
                let Some(next) = jump else {
                    break;
                };
                mark(next, &mut visited);
                visited_count += 1;
                route.push(next);
                current = next;
            }
        }
    }

    close_walk(maze, &mut route);
    route
}

fn close_walk(maze: &Maze, route: &mut Vec<Vec2>) {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return;
    };
    if let Some(path) = shortest_path(maze, last, first) {
        if path.len() > 2 {
            route.extend_from_slice(&path[1..path.len() - 1]);
        }
    }
}
