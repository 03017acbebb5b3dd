// Background decode pool for wall slots.
// Workers decode media to tile-sized RGBA off the main thread; textures
// are created and delivered on the GTK main thread via a glib timer.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use tracing::{debug, warn};

use crate::image_loader;
use crate::models::{MediaItem, SlotId};

const LOADER_THREADS: usize = 2;
const LOADER_QUEUE: usize = 64;
const CACHE_ENTRIES: usize = 256;

/// Interval between result pumps on the main thread.
const PUMP_INTERVAL_MS: u64 = 16;

#[derive(Debug)]
struct SlotDecodeRequest {
    slot: SlotId,
    item: MediaItem,
    token: u64,
}

#[derive(Debug)]
struct SlotDecodeResult {
    slot: SlotId,
    item: MediaItem,
    token: u64,
    rgba: Option<Vec<u8>>,
}

/// Callback invoked on the main thread for every finished decode. The
/// texture is `None` when decoding failed.
pub type SlotTextureCallback = Box<dyn Fn(SlotId, MediaItem, u64, Option<&Texture>) + 'static>;

/// Decode worker pool feeding textures to the wall.
///
/// Requests go to a bounded queue; a full queue drops the request (the
/// rotation timer will simply feed another slot next tick). Finished
/// tiles are cached by path so a short playlist cycling over the wall
/// stops hitting the decoder entirely.
pub struct SlotImageLoader {
    request_tx: flume::Sender<SlotDecodeRequest>,
    result_rx: flume::Receiver<SlotDecodeResult>,
    tile_width: i32,
    tile_height: i32,
    cache: RefCell<lru::LruCache<PathBuf, Texture>>,
    callback: RefCell<Option<SlotTextureCallback>>,
}

impl SlotImageLoader {
    pub fn new(tile_width: i32, tile_height: i32) -> Rc<Self> {
        let (request_tx, request_rx) = flume::bounded::<SlotDecodeRequest>(LOADER_QUEUE);
        let (result_tx, result_rx) = flume::unbounded::<SlotDecodeResult>();

        for _ in 0..LOADER_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            std::thread::spawn(move || {
                while let Ok(req) = rx.recv() {
                    let rgba = match image_loader::decode_tile(&req.item, tile_width, tile_height) {
                        Ok(rgba) => Some(rgba),
                        Err(err) => {
                            debug!(path = ?req.item.path, error = ?err, "decode failed");
                            None
                        }
                    };
                    let _ = tx.send(SlotDecodeResult {
                        slot: req.slot,
                        item: req.item,
                        token: req.token,
                        rgba,
                    });
                }
            });
        }

        let loader = Rc::new(Self {
            request_tx,
            result_rx,
            tile_width,
            tile_height,
            cache: RefCell::new(lru::LruCache::new(
                NonZeroUsize::new(CACHE_ENTRIES).expect("cache capacity is non-zero"),
            )),
            callback: RefCell::new(None),
        });

        let loader_weak = Rc::downgrade(&loader);
        glib::timeout_add_local(Duration::from_millis(PUMP_INTERVAL_MS), move || {
            if let Some(loader) = loader_weak.upgrade() {
                loader.process_results();
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });

        loader
    }

    /// Registers the texture consumer. Only one consumer: the wall.
    pub fn connect_ready<F>(&self, callback: F)
    where
        F: Fn(SlotId, MediaItem, u64, Option<&Texture>) + 'static,
    {
        *self.callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Queues a decode for `slot`. Cache hits deliver synchronously.
    pub fn request(&self, slot: SlotId, item: MediaItem, token: u64) {
        if let Some(texture) = self.cache.borrow_mut().get(&item.path).cloned() {
            if let Some(ref callback) = *self.callback.borrow() {
                callback(slot, item, token, Some(&texture));
            }
            return;
        }

        if self
            .request_tx
            .try_send(SlotDecodeRequest { slot, item, token })
            .is_err()
        {
            warn!("decode queue full, dropping request");
        }
    }

    fn process_results(&self) {
        while let Ok(result) = self.result_rx.try_recv() {
            let texture = result.rgba.and_then(|rgba| {
                create_texture_from_rgba(rgba, self.tile_width as u32, self.tile_height as u32)
            });
            if let Some(ref texture) = texture {
                self.cache
                    .borrow_mut()
                    .put(result.item.path.clone(), texture.clone());
            }
            if let Some(ref callback) = *self.callback.borrow() {
                callback(result.slot, result.item, result.token, texture.as_ref());
            }
        }
    }
}

fn create_texture_from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba.len() < expected {
        return None;
    }
    let bytes = glib::Bytes::from_owned(rgba);
    let texture = gdk::MemoryTexture::new(
        width as i32,
        height as i32,
        gdk::MemoryFormat::R8g8b8a8,
        &bytes,
        (width * 4) as usize,
    );
    Some(texture.upcast())
}
