use std::collections::VecDeque;
use std::sync::{ Arc, Condvar, Mutex };
use std::thread::{ self, JoinHandle };
use std::time::Duration;

use log::{ debug, info, warn };

use crate::canvas::Canvas;
use crate::color::{ self, Color };
use crate::error::{ Result, TracerError };
use crate::scene::Scene;
use crate::tile::{ RenderTile, TileManager };

/// Everything a render worker needs: the scene (read-only), the tile
/// grid's progress counters, and the shared output canvas.
pub struct RenderContext {
    pub scene: Scene,
    pub tiles: TileManager,
    pub canvas: Mutex<Canvas>,
}

impl RenderContext {
    pub fn new(scene: Scene, tile_size: usize) -> RenderContext {
        let width = scene.camera().width();
        let height = scene.camera().height();

        RenderContext {
            scene,
            tiles: TileManager::new(width, height, tile_size),
            canvas: Mutex::new(Canvas::new(width, height)),
        }
    }
}

struct PoolState {
    queue: VecDeque<RenderTile>,
    stopped: bool,
    active: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    wakeup: Condvar,
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, shared: Arc<PoolShared>, context: Arc<RenderContext>)
        -> Worker {
        let handle = thread::spawn(move || loop {
            let tile = {
                let mut state = shared.state.lock().unwrap();
                loop {
                    if state.stopped {
                        debug!("worker {} exiting", id);
                        return;
                    }
                    if state.active {
                        if let Some(tile) = state.queue.pop_front() {
                            break tile;
                        }
                    }
                    state = shared.wakeup.wait(state).unwrap();
                }
            };

            let pixels = render_tile(&context, &tile);
            if let Err(err) = context.canvas.lock().unwrap()
                .blit(&tile, &pixels) {
                warn!("worker {} failed to place a tile: {}", id, err);
            }
            context.tiles.tile_completed();
        });

        Worker { id, handle: Some(handle) }
    }
}

/// Renders one tile into a private buffer, row-major top to bottom.
fn render_tile(context: &RenderContext, tile: &RenderTile) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(tile.width * tile.height);

    for dy in 0..tile.height {
        for dx in 0..tile.width {
            let color = match context.scene.camera()
                .generate_ray(tile.x + dx, tile.y + dy) {
                Ok(ray) => context.scene.color_at(&ray),
                Err(_) => color::BLACK,
            };
            pixels.push(color);
        }
    }

    pixels
}

/// A fixed pool of render workers fed from a shared FIFO tile queue.
///
/// Workers block on a condition variable while the queue is empty or the
/// pool is paused. Stopping is permanent and immediate: in-flight tiles
/// finish, tiles still queued are abandoned, and further `execute` calls
/// fail. Dropping the pool stops it and joins every worker.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<Worker>,
}

impl ThreadPool {
    pub fn new(threads: usize, context: Arc<RenderContext>) -> ThreadPool {
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                stopped: false,
                active: true,
            }),
            wakeup: Condvar::new(),
        });

        let workers = (0..threads.max(1))
            .map(|id| Worker::spawn(id, Arc::clone(&shared),
                Arc::clone(&context)))
            .collect();

        ThreadPool { shared, workers }
    }

    /// Queues a tile for rendering.
    pub fn execute(&self, tile: RenderTile) -> Result<()> {
        let mut state = self.shared.state.lock().unwrap();
        if state.stopped {
            return Err(TracerError::PoolStopped);
        }

        state.queue.push_back(tile);
        self.shared.wakeup.notify_one();
        Ok(())
    }

    /// Stops workers from taking new tiles; in-flight tiles finish.
    pub fn pause(&self) {
        self.shared.state.lock().unwrap().active = false;
    }

    pub fn resume(&self) {
        self.shared.state.lock().unwrap().active = true;
        self.shared.wakeup.notify_all();
    }

    /// Permanently stops the pool, abandoning any tiles still queued.
    pub fn stop(&self) {
        self.shared.state.lock().unwrap().stopped = true;
        self.shared.wakeup.notify_all();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    warn!("worker {} panicked", worker.id);
                }
            }
        }
    }
}

/// A sensible worker count: every core but one, and never zero.
pub fn default_thread_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// Renders the scene across `threads` workers, one tile at a time, and
/// returns the finished canvas.
pub fn render_parallel(scene: Scene, threads: usize, tile_size: usize)
    -> Result<Canvas> {
    let context = Arc::new(RenderContext::new(scene, tile_size));
    let pool = ThreadPool::new(threads, Arc::clone(&context));

    info!("rendering {} tiles on {} threads",
        context.tiles.total_tiles(), threads.max(1));

    while let Some(tile) = context.tiles.next_tile() {
        pool.execute(tile)?;
    }

    while !context.tiles.is_finished() {
        debug!("render progress: {:.0}%", context.tiles.progress());
        thread::sleep(Duration::from_millis(10));
    }

    // Joining the workers releases their context handles.
    drop(pool);

    let canvas = match Arc::try_unwrap(context) {
        Ok(context) => context.canvas.into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(context) => context.canvas.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone(),
    };

    Ok(canvas)
}

/* Tests */

#[cfg(test)]
fn test_scene(width: usize, height: usize) -> Scene {
    use crate::camera::Camera;
    use crate::shape::Primitive;
    use crate::vector::Vector3D;

    let camera = Camera::new(Vector3D::new(0.0, -5.0, 0.0), Vector3D::zero(),
        std::f64::consts::FRAC_PI_2, width, height).unwrap();

    let mut scene = Scene::new(camera);
    scene.set_ambient_intensity(0.5);
    scene.add_primitive(Primitive::sphere(1.0).unwrap());
    scene
}

#[cfg(test)]
fn wait_for_completion(context: &RenderContext) {
    for _ in 0..500 {
        if context.tiles.is_finished() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("render did not finish in time");
}

#[test]
fn pool_renders_every_queued_tile() {
    let context = Arc::new(RenderContext::new(test_scene(32, 32), 8));
    let pool = ThreadPool::new(3, Arc::clone(&context));

    while let Some(tile) = context.tiles.next_tile() {
        pool.execute(tile).unwrap();
    }

    wait_for_completion(&context);
    assert_eq!(context.tiles.completed_tiles(), 16);
}

#[test]
fn execute_after_stop_fails() {
    let context = Arc::new(RenderContext::new(test_scene(8, 8), 8));
    let pool = ThreadPool::new(1, Arc::clone(&context));

    pool.stop();

    let tile = context.tiles.next_tile().unwrap();
    assert!(matches!(pool.execute(tile), Err(TracerError::PoolStopped)));
}

#[test]
fn paused_pool_holds_work_until_resumed() {
    let context = Arc::new(RenderContext::new(test_scene(16, 16), 8));
    let pool = ThreadPool::new(2, Arc::clone(&context));

    pool.pause();
    while let Some(tile) = context.tiles.next_tile() {
        pool.execute(tile).unwrap();
    }

    thread::sleep(Duration::from_millis(50));
    assert_eq!(context.tiles.completed_tiles(), 0);

    pool.resume();
    wait_for_completion(&context);
    assert_eq!(context.tiles.completed_tiles(), 4);
}

#[test]
fn stop_abandons_queued_tiles() {
    let context = Arc::new(RenderContext::new(test_scene(16, 16), 8));
    let pool = ThreadPool::new(2, Arc::clone(&context));

    pool.pause();
    while let Some(tile) = context.tiles.next_tile() {
        pool.execute(tile).unwrap();
    }

    pool.stop();
    drop(pool);

    assert_eq!(context.tiles.completed_tiles(), 0);
}

#[test]
fn render_parallel_produces_a_full_canvas() {
    use crate::color;

    let canvas = render_parallel(test_scene(32, 32), 2, 16).unwrap();

    assert_eq!(canvas.width(), 32);
    assert_eq!(canvas.height(), 32);

    // The sphere covers the image center; ambient fill lights it.
    let center = canvas.read_pixel(16, 16).unwrap();
    assert_ne!(center, color::BLACK);

    // The corners look past the sphere into the background.
    assert_eq!(canvas.read_pixel(0, 0).unwrap(), color::BLACK);
}

#[test]
fn default_thread_count_is_positive() {
    assert!(default_thread_count() >= 1);
}
