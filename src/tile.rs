use std::sync::atomic::{ AtomicUsize, Ordering };

/// A rectangular region of the output image, in pixels. Tiles on the
/// right and bottom edges may be smaller than the nominal tile size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderTile {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Carves an image into a grid of tiles and hands them out to render
/// workers.
///
/// Issuance and completion tracking are both lock-free: `next_tile` claims
/// a tile index with a single atomic increment, so concurrent callers each
/// receive a distinct tile and none is ever handed out twice.
#[derive(Debug)]
pub struct TileManager {
    image_width: usize,
    image_height: usize,
    tile_size: usize,
    columns: usize,
    rows: usize,
    next: AtomicUsize,
    completed: AtomicUsize,
}

fn div_ceil(n: usize, d: usize) -> usize {
    (n + d - 1) / d
}

impl TileManager {
    pub fn new(image_width: usize, image_height: usize, tile_size: usize)
        -> TileManager {
        let tile_size = tile_size.max(1);

        TileManager {
            image_width,
            image_height,
            tile_size,
            columns: div_ceil(image_width, tile_size),
            rows: div_ceil(image_height, tile_size),
            next: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn total_tiles(&self) -> usize {
        self.columns * self.rows
    }

    /// Claims the next unissued tile, or `None` once the grid is
    /// exhausted.
    pub fn next_tile(&self) -> Option<RenderTile> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        if index >= self.total_tiles() {
            return None;
        }

        let x = (index % self.columns) * self.tile_size;
        let y = (index / self.columns) * self.tile_size;

        Some(RenderTile {
            x,
            y,
            width: self.tile_size.min(self.image_width - x),
            height: self.tile_size.min(self.image_height - y),
        })
    }

    /// Records that one issued tile has been fully rendered.
    pub fn tile_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn completed_tiles(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.completed_tiles() >= self.total_tiles()
    }

    /// Completion as a percentage in [0, 100].
    pub fn progress(&self) -> f64 {
        if self.total_tiles() == 0 {
            return 100.0;
        }
        100.0 * self.completed_tiles() as f64 / self.total_tiles() as f64
    }

    /// Rewinds both counters so the same grid can be rendered again.
    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
    }
}

/* Tests */

#[test]
fn grid_covers_the_image_exactly() {
    let manager = TileManager::new(100, 100, 64);
    assert_eq!(manager.total_tiles(), 4);

    let mut covered = 0;
    while let Some(tile) = manager.next_tile() {
        assert!(tile.x + tile.width <= 100);
        assert!(tile.y + tile.height <= 100);
        covered += tile.width * tile.height;
    }

    assert_eq!(covered, 100 * 100);
    assert!(manager.next_tile().is_none());
}

#[test]
fn edge_tiles_shrink() {
    let manager = TileManager::new(100, 100, 64);

    let first = manager.next_tile().unwrap();
    assert_eq!(first, RenderTile { x: 0, y: 0, width: 64, height: 64 });

    let second = manager.next_tile().unwrap();
    assert_eq!(second, RenderTile { x: 64, y: 0, width: 36, height: 64 });
}

#[test]
fn exact_multiple_needs_no_partial_tiles() {
    let manager = TileManager::new(128, 64, 64);
    assert_eq!(manager.total_tiles(), 2);

    while let Some(tile) = manager.next_tile() {
        assert_eq!(tile.width, 64);
        assert_eq!(tile.height, 64);
    }
}

#[test]
fn progress_tracks_completions() {
    let manager = TileManager::new(100, 100, 64);
    assert!(!manager.is_finished());
    assert_eq!(manager.progress(), 0.0);

    for _ in 0..4 {
        manager.next_tile().unwrap();
        manager.tile_completed();
    }

    assert_eq!(manager.completed_tiles(), 4);
    assert!(manager.is_finished());
    assert_eq!(manager.progress(), 100.0);
}

#[test]
fn reset_allows_another_pass() {
    let manager = TileManager::new(100, 100, 64);
    while manager.next_tile().is_some() {
        manager.tile_completed();
    }

    manager.reset();
    assert_eq!(manager.completed_tiles(), 0);
    assert!(manager.next_tile().is_some());
}

#[test]
fn concurrent_claims_never_overlap() {
    use std::collections::HashSet;
    use std::sync::{ Arc, Mutex };

    let manager = Arc::new(TileManager::new(512, 512, 32));
    let seen = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..4).map(|_| {
        let manager = Arc::clone(&manager);
        let seen = Arc::clone(&seen);

        std::thread::spawn(move || {
            while let Some(tile) = manager.next_tile() {
                let fresh = seen.lock().unwrap().insert((tile.x, tile.y));
                assert!(fresh, "tile issued twice");
                manager.tile_completed();
            }
        })
    }).collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(seen.lock().unwrap().len(), manager.total_tiles());
    assert!(manager.is_finished());
    assert_eq!(manager.progress(), 100.0);
}
