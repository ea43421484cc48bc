use crate::error::MazeError;
use crate::types::{CellKind, Direction, Vec2};

/// Static walkable topology of one level. Only pellet consumption and
/// transient walls change it after load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
}

impl Maze {
    pub fn from_grid(grid: &[Vec<u8>]) -> Result<Self, MazeError> {
        let height = grid.len();
        let width = grid.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::EmptyGrid);
        }
        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in grid.iter().enumerate() {
            if row.len() != width {
                return Err(MazeError::RaggedRow {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, code) in row.iter().enumerate() {
                let kind = CellKind::from_code(*code)
                    .ok_or(MazeError::UnknownCell { code: *code, x, y })?;
                cells.push(kind);
            }
        }
        Ok(Self {
            width: width as i32,
            height: height as i32,
            cells,
        })
    }

    /// Rows of template digits, e.g. `"1021"`. Non-digit characters are
    /// reported as unknown codes.
    pub fn from_rows(rows: &[&str]) -> Result<Self, MazeError> {
        let grid: Vec<Vec<u8>> = rows
            .iter()
            .map(|row| {
                row.bytes()
                    .map(|b| if b.is_ascii_digit() { b - b'0' } else { b })
                    .collect()
            })
            .collect();
        Self::from_grid(&grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// No two cells are further apart than this in Manhattan distance.
    pub fn reach_radius(&self) -> i32 {
        self.width + self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub(crate) fn index_of(&self, pos: Vec2) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub(crate) fn pos_of(&self, index: usize) -> Vec2 {
        let index = index as i32;
        Vec2::new(index % self.width, index / self.width)
    }

    pub fn kind_at(&self, pos: Vec2) -> Option<CellKind> {
        self.index_of(pos).and_then(|idx| self.cells.get(idx).copied())
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, pos: Vec2) -> bool {
        self.kind_at(pos).map(|kind| kind == CellKind::Wall).unwrap_or(true)
    }

    pub fn is_open(&self, pos: Vec2) -> bool {
        !self.is_wall(pos)
    }

    /// Folds `x` onto the torus; `None` when `y` leaves the grid.
    pub fn wrap(&self, pos: Vec2) -> Option<Vec2> {
        if pos.y < 0 || pos.y >= self.height {
            return None;
        }
        Some(Vec2::new(pos.x.rem_euclid(self.width), pos.y))
    }

    pub fn wrap_clamped(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.rem_euclid(self.width),
            pos.y.clamp(0, self.height - 1),
        )
    }

    pub fn neighbor(&self, pos: Vec2, dir: Direction) -> Option<Vec2> {
        if dir == Direction::None {
            return None;
        }
        let (dx, dy) = dir.delta();
        self.wrap(Vec2::new(pos.x + dx, pos.y + dy))
    }

    /// A move is legal iff it stays on the grid vertically and does not end on a wall.
    pub fn can_move(&self, pos: Vec2, dir: Direction) -> bool {
        self.neighbor(pos, dir)
            .map(|next| self.is_open(next))
            .unwrap_or(false)
    }

    pub fn open_neighbors(&self, pos: Vec2) -> impl Iterator<Item = (Direction, Vec2)> + '_ {
        Direction::CARDINAL.into_iter().filter_map(move |dir| {
            self.neighbor(pos, dir)
                .filter(|next| self.is_open(*next))
                .map(|next| (dir, next))
        })
    }

    pub fn legal_directions(&self, pos: Vec2) -> Vec<Direction> {
        self.open_neighbors(pos).map(|(dir, _)| dir).collect()
    }

    /// Non-wall cells in raster order.
    pub fn open_cells(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind != CellKind::Wall)
            .map(|(idx, _)| self.pos_of(idx))
    }

    pub fn pellets_remaining(&self) -> usize {
        self.cells.iter().filter(|kind| kind.is_pellet()).count()
    }

    pub fn consume(&mut self, pos: Vec2) -> Option<CellKind> {
        let idx = self.index_of(pos)?;
        let cell = self.cells.get_mut(idx)?;
        if !cell.is_pellet() {
            return None;
        }
        let eaten = *cell;
        *cell = CellKind::Path;
        Some(eaten)
    }

    pub(crate) fn set_kind(&mut self, pos: Vec2, kind: CellKind) -> bool {
        let Some(idx) = self.index_of(pos) else {
            return false;
        };
        match self.cells.get_mut(idx) {
            Some(cell) => {
                *cell = kind;
                true
            }
            None => false,
        }
    }
}
