use crate::constants::MAX_PLAYER_STEPS_PER_TICK;
use crate::maze::Maze;
use crate::types::{Direction, PlayerView, Vec2};

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub dir: Direction,
    pub queued: Direction,
    pub spawn: Vec2,
    move_credit: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            dir: Direction::None,
            queued: Direction::None,
            spawn,
            move_credit: 0.0,
        }
    }

    pub fn set_queued_direction(&mut self, dir: Direction) {
        self.queued = dir;
    }

    /// One grid step: adopt the queued heading if its destination is open,
    /// then try to move along the current heading. Returns whether the
    /// player changed cell. Illegal moves leave position and heading as they were.
    pub fn tick(&mut self, maze: &Maze) -> bool {
        if self.queued != Direction::None && maze.can_move(self.pos, self.queued) {
            self.dir = self.queued;
        }
        match maze.neighbor(self.pos, self.dir) {
            Some(next) if maze.is_open(next) => {
                self.pos = next;
                true
            }
            _ => false,
        }
    }

    /// Speed-scaled movement. Each whole unit of accumulated credit buys one
    /// [`Player::tick`]; returns every cell entered, in order.
    pub fn advance(&mut self, maze: &Maze, speed: f32) -> Vec<Vec2> {
        self.move_credit += speed.max(0.0);
        let mut entered = Vec::new();
        let mut steps = 0;
        while self.move_credit >= 1.0 && steps < MAX_PLAYER_STEPS_PER_TICK {
            self.move_credit -= 1.0;
            steps += 1;
            if self.tick(maze) {
                entered.push(self.pos);
            }
        }
        self.move_credit = self.move_credit.min(1.0);
        entered
    }

    pub fn reset_to_spawn(&mut self) {
        self.pos = self.spawn;
        self.dir = Direction::None;
        self.queued = Direction::None;
        self.move_credit = 0.0;
    }

    pub fn view(&self, invincible: bool, slowed: bool) -> PlayerView {
        PlayerView {
            x: self.pos.x,
            y: self.pos.y,
            dir: self.dir,
            queued_dir: self.queued,
            invincible,
            slowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_field() -> Maze {
        Maze::from_rows(&["00000", "02020", "00000"]).expect("valid maze")
    }

    #[test]
    fn queued_direction_waits_for_a_legal_opening() {
        let maze = Maze::from_rows(&["11111", "00000", "11011"]).expect("valid maze");
        let mut player = Player::new(Vec2::new(0, 1));
        player.dir = Direction::Right;
        player.set_queued_direction(Direction::Down);

        assert!(player.tick(&maze));
        assert_eq!(player.pos, Vec2::new(1, 1));
        assert_eq!(player.dir, Direction::Right);

        assert!(player.tick(&maze));
        assert_eq!(player.pos, Vec2::new(2, 1));

        assert!(player.tick(&maze));
        assert_eq!(player.dir, Direction::Down);
        assert_eq!(player.pos, Vec2::new(2, 2));
    }

    #[test]
    fn leftward_move_from_column_zero_wraps() {
        let maze = open_field();
        let mut player = Player::new(Vec2::new(0, 0));
        player.set_queued_direction(Direction::Left);
        assert!(player.tick(&maze));
        assert_eq!(player.pos, Vec2::new(maze.width() - 1, 0));
    }

    #[test]
    fn moving_off_the_top_is_rejected_and_heading_kept() {
        let maze = open_field();
        let mut player = Player::new(Vec2::new(0, 0));
        player.dir = Direction::Up;
        player.set_queued_direction(Direction::Up);
        assert!(!player.tick(&maze));
        assert_eq!(player.pos, Vec2::new(0, 0));
        assert_eq!(player.dir, Direction::Up);
        assert_eq!(player.queued, Direction::Up);

        let mut bottom = Player::new(Vec2::new(2, 2));
        bottom.dir = Direction::Down;
        assert!(!bottom.tick(&maze));
        assert_eq!(bottom.pos.y, 2);
    }

    #[test]
    fn none_never_moves() {
        let maze = open_field();
        let mut player = Player::new(Vec2::new(2, 1));
        for _ in 0..5 {
            assert!(!player.tick(&maze));
        }
        assert_eq!(player.pos, Vec2::new(2, 1));
    }

    #[test]
    fn pellets_are_traversable() {
        let maze = open_field();
        let mut player = Player::new(Vec2::new(0, 1));
        player.set_queued_direction(Direction::Right);
        assert!(player.tick(&maze));
        assert_eq!(player.pos, Vec2::new(1, 1));
    }

    #[test]
    fn speed_credit_buys_extra_steps() {
        let maze = open_field();
        let mut player = Player::new(Vec2::new(0, 0));
        player.set_queued_direction(Direction::Right);
        let moved: usize = (0..4).map(|_| player.advance(&maze, 1.5).len()).sum();
        assert_eq!(moved, 6);

        let mut slow = Player::new(Vec2::new(0, 0));
        slow.set_queued_direction(Direction::Right);
        let moved: usize = (0..4).map(|_| slow.advance(&maze, 0.5).len()).sum();
        assert_eq!(moved, 2);
    }
}
