//! Deterministic snake-grid simulator used as the fitness oracle.

use crate::grid::{manhattan, Cell, Direction, Turn};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The snake: head, body (oldest segment first, head excluded), heading.
#[derive(Debug, Clone)]
pub struct Snake {
    pub head: Cell,
    pub body: Vec<Cell>,
    pub heading: Direction,
    pub alive: bool,
    /// Ticks since the last food was eaten
    pub hunger: u32,
}

impl Snake {
    /// A length-1 snake centered on an `S x S` grid, heading up
    fn spawn(grid_size: usize) -> Self {
        let center = (grid_size / 2) as i32;
        Self {
            head: Cell::new(center, center),
            body: Vec::new(),
            heading: Direction::Up,
            alive: true,
            hunger: 0,
        }
    }

    /// Snake length including the head
    pub fn length(&self) -> usize {
        1 + self.body.len()
    }

    /// Whether the cell is occupied by the head or any body segment
    pub fn occupies(&self, cell: Cell) -> bool {
        self.head == cell || self.body.contains(&cell)
    }
}

/// What a single tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the episode ended this tick
    pub terminated: bool,
    /// Whether the snake ate food this tick
    pub ate_food: bool,
}

/// The deterministic game simulation.
///
/// Food placement is driven by a `ChaCha8Rng` reseeded on every `reset`, so
/// `(seed, policy weights)` reproduces an identical cell-by-cell trajectory.
pub struct GameSim {
    grid_size: usize,
    /// Hunger cutoff for autonomous agents; `None` disables the cutoff
    stagnation_cap: Option<u32>,
    snake: Snake,
    food: Cell,
    rng: ChaCha8Rng,
}

impl GameSim {
    /// Create a simulation, immediately reset with the given seed
    pub fn new(grid_size: usize, stagnation_cap: Option<u32>, seed: u64) -> Self {
        let mut sim = Self {
            grid_size,
            stagnation_cap,
            snake: Snake::spawn(grid_size),
            food: Cell::new(0, 0),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        sim.reset(seed);
        sim
    }

    /// Restart the episode: reseed the placement generator, respawn the
    /// snake centered and heading up, place food off the snake.
    pub fn reset(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.snake = Snake::spawn(self.grid_size);
        self.food = self.spawn_food();
    }

    /// Advance one tick with the requested absolute heading.
    ///
    /// A heading that exactly reverses the current one is ignored, so agents
    /// can only go straight or turn. Every input maps to either a new valid
    /// state or a terminal state; on a terminal tick the snake stays where it
    /// was and only the alive flag drops.
    pub fn step(&mut self, candidate: Direction) -> StepOutcome {
        if !self.snake.alive {
            return StepOutcome {
                terminated: true,
                ate_food: false,
            };
        }

        if !candidate.is_reverse_of(self.snake.heading) {
            self.snake.heading = candidate;
        }

        let new_head = self.snake.head.offset(self.snake.heading);

        if !self.in_bounds(new_head) || self.hits_body(new_head) {
            self.snake.alive = false;
            return StepOutcome {
                terminated: true,
                ate_food: false,
            };
        }

        let ate_food = new_head == self.food;
        let old_head = self.snake.head;
        self.snake.body.push(old_head);
        self.snake.head = new_head;

        if ate_food {
            self.snake.hunger = 0;
            self.food = self.spawn_food();
        } else {
            self.snake.body.remove(0);
            self.snake.hunger += 1;

            if let Some(cap) = self.stagnation_cap {
                if self.snake.hunger > cap {
                    self.snake.alive = false;
                    return StepOutcome {
                        terminated: true,
                        ate_food: false,
                    };
                }
            }
        }

        StepOutcome {
            terminated: false,
            ate_food,
        }
    }

    /// Extract the 5-element sensor vector for the current state.
    ///
    /// Rays along forward / left-of-heading / right-of-heading count free
    /// cells until a body segment or the wall (clamped to minimum 1). The
    /// food offset is decomposed in the heading's frame: `side` is positive
    /// when the food lies to the right of the heading, `front` is positive
    /// when it lies ahead. Both rotate with the heading, so the semantics
    /// are orientation-invariant.
    pub fn sense(&self) -> [f32; 5] {
        let heading = self.snake.heading;
        let forward = self.ray(heading);
        let left = self.ray(heading.turned(Turn::Left));
        let right = self.ray(heading.turned(Turn::Right));

        let (hx, hy) = heading.delta();
        let dx = self.food.x - self.snake.head.x;
        let dy = self.food.y - self.snake.head.y;

        // right-of-heading basis vector: (-hy, hx)
        let side = (dx * -hy + dy * hx) as f32;
        let front = (dx * hx + dy * hy) as f32;

        [forward, left, right, side, front]
    }

    /// Fitness at the moment of death: length plus a terminal-proximity
    /// tie-breaker. The distance is clamped to a minimum of 1 so the
    /// denominator can never be zero.
    pub fn terminal_score(&self) -> f32 {
        let dist = manhattan(self.snake.head, self.food).max(1);
        self.snake.length() as f32 + 1.0 / dist as f32
    }

    /// Free cells along `dir` from the head until a body segment or the
    /// wall, clamped to minimum 1
    fn ray(&self, dir: Direction) -> f32 {
        let mut count = 0u32;
        let mut cell = self.snake.head.offset(dir);
        while self.in_bounds(cell) && !self.snake.body.contains(&cell) {
            count += 1;
            cell = cell.offset(dir);
        }
        count.max(1) as f32
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        let size = self.grid_size as i32;
        cell.x >= 0 && cell.x < size && cell.y >= 0 && cell.y < size
    }

    /// Collision against the body, excluding the oldest (tail) cell, which
    /// vacates on the same tick the head would enter it
    fn hits_body(&self, cell: Cell) -> bool {
        self.snake.body.iter().skip(1).any(|seg| *seg == cell)
    }

    /// Draw a food cell uniformly over the unoccupied cells
    fn spawn_food(&mut self) -> Cell {
        let size = self.grid_size as i32;
        loop {
            let cell = Cell::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            if !self.snake.occupies(cell) {
                return cell;
            }
        }
    }

    // Accessors for the display host. The core hands out state; drawing is
    // the host's job.

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn is_alive(&self) -> bool {
        self.snake.alive
    }

    pub fn heading(&self) -> Direction {
        self.snake.heading
    }

    pub fn length(&self) -> usize {
        self.snake.length()
    }
}
