// Wall widget: hosts the slot grid inside a gtk4::Fixed.
// One Picture per arena slot; the grid decides positions and the widget
// only moves, shows, and fills them.

use gdk4::Texture;
use glib::Object;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{gdk, glib, ContentFit, Picture};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

use crate::config::WallConfig;
use crate::layout::{WallError, WallGrid};
use crate::models::{MediaItem, SlotId};

static NEXT_LOAD_TOKEN: AtomicU64 = AtomicU64::new(1);

// Placeholder texture - generated once and reused
fn placeholder_texture() -> &'static Texture {
    static PLACEHOLDER: OnceLock<Texture> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        // Create a simple dark gray placeholder texture (64x64)
        let width = 64;
        let height = 64;
        let mut pixels = vec![0u8; width * height * 4];

        // Fill with dark gray (#1a1a1a) RGBA
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[0] = 0x1a; // R
            chunk[1] = 0x1a; // G
            chunk[2] = 0x1a; // B
            chunk[3] = 0xff; // A
        }

        let bytes = glib::Bytes::from_owned(pixels);
        gdk::MemoryTexture::new(
            width as i32,
            height as i32,
            gdk::MemoryFormat::R8g8b8a8,
            &bytes,
            width * 4,
        )
        .upcast()
    })
}

mod imp {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    pub struct WallWidgetInner {
        pub grid: RefCell<Option<WallGrid<MediaItem>>>,
        /// One Picture per arena slot, indexed by the grid's arena key.
        pub pictures: RefCell<Vec<Picture>>,
        /// Latest load token per arena slot; stale decodes are dropped.
        pub load_tokens: RefCell<Vec<u64>>,
        pub last_size: Cell<(i32, i32)>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for WallWidgetInner {
        const NAME: &'static str = "MediaWallWidget";
        type Type = super::WallWidget;
        type ParentType = gtk4::Fixed;
    }

    impl ObjectImpl for WallWidgetInner {}

    impl WidgetImpl for WallWidgetInner {
        fn size_allocate(&self, width: i32, height: i32, baseline: i32) {
            self.obj().reflow(width, height);
            self.parent_size_allocate(width, height, baseline);
        }
    }

    impl FixedImpl for WallWidgetInner {}
}

glib::wrapper! {
    pub struct WallWidget(ObjectSubclass<imp::WallWidgetInner>)
        @extends gtk4::Fixed, gtk4::Widget,
        @implements gtk4::Accessible, gtk4::Buildable, gtk4::ConstraintTarget;
}

impl WallWidget {
    pub fn new() -> Self {
        Object::builder().build()
    }

    /// Attaches a grid with the given tile geometry. `display_width` and
    /// `display_height` are the monitor bounds used for full-visibility
    /// checks. Fails on invalid tile geometry.
    pub fn setup(
        &self,
        config: &WallConfig,
        display_width: i32,
        display_height: i32,
    ) -> Result<(), WallError> {
        let grid = WallGrid::new(
            config.tile_width,
            config.tile_height,
            config.padding,
            display_width,
            display_height,
        )?;
        *self.imp().grid.borrow_mut() = Some(grid);
        Ok(())
    }

    /// Re-derives the grid for a new allocation and repositions every
    /// slot. Zero or shrinking allocations during window setup produce a
    /// too-small grid; those passes are logged and skipped, leaving the
    /// last good layout in place.
    fn reflow(&self, width: i32, height: i32) {
        let imp = self.imp();
        if imp.last_size.get() == (width, height) {
            return;
        }

        let mut grid_ref = imp.grid.borrow_mut();
        let Some(grid) = grid_ref.as_mut() else {
            return;
        };

        if let Err(err) = grid.resize(width, height) {
            warn!(error = %err, "skipping wall reflow");
            return;
        }
        imp.last_size.set((width, height));

        self.ensure_pictures(grid);
        grid.layout();

        let pictures = imp.pictures.borrow();
        for id in grid.slot_ids() {
            let (x, y) = grid.position(id);
            let picture = &pictures[grid.arena_index(id)];
            self.move_(picture, x as f64, y as f64);
            picture.set_visible(grid.is_visible(id));
        }
        // Slots past the current grid are detached, not destroyed.
        for picture in pictures.iter().skip(grid.grid_slot_count()) {
            picture.set_visible(false);
        }

        debug!(width, height, slots = grid.grid_slot_count(), "wall reflowed");
    }

    /// Grows the Picture pool to match the slot arena.
    fn ensure_pictures(&self, grid: &WallGrid<MediaItem>) {
        let imp = self.imp();
        let mut pictures = imp.pictures.borrow_mut();
        let mut load_tokens = imp.load_tokens.borrow_mut();

        while pictures.len() < grid.slot_count() {
            let picture = Picture::new();
            picture.set_size_request(grid.tile_width(), grid.tile_height());
            picture.set_can_shrink(true);
            picture.set_content_fit(ContentFit::Cover);
            picture.set_paintable(Some(placeholder_texture()));
            picture.add_css_class("wall-tile");
            self.put(&picture, 0.0, 0.0);
            pictures.push(picture);
            load_tokens.push(0);
        }
    }

    /// Picks the slot the next piece of media should go to.
    pub fn next_load_target(&self, require_fully_on_screen: bool) -> Option<SlotId> {
        self.imp()
            .grid
            .borrow_mut()
            .as_mut()?
            .next_load_target(require_fully_on_screen)
    }

    /// Claims a load token for `slot`; an earlier in-flight decode for
    /// the same slot becomes stale.
    pub fn begin_load(&self, slot: SlotId) -> u64 {
        let imp = self.imp();
        let grid = imp.grid.borrow();
        let Some(grid) = grid.as_ref() else {
            return 0;
        };
        let token = NEXT_LOAD_TOKEN.fetch_add(1, Ordering::Relaxed);
        imp.load_tokens.borrow_mut()[grid.arena_index(slot)] = token;
        token
    }

    /// Installs a freshly decoded texture: the slot is hidden for the
    /// swap, assigned, then shown again. Stale and failed decodes are
    /// dropped.
    pub fn apply_texture(
        &self,
        slot: SlotId,
        item: MediaItem,
        token: u64,
        texture: Option<&Texture>,
    ) {
        let imp = self.imp();
        let mut grid_ref = imp.grid.borrow_mut();
        let Some(grid) = grid_ref.as_mut() else {
            return;
        };
        if slot.column >= grid.columns() || slot.row >= grid.rows() {
            // The wall shrank while the decode was in flight.
            trace!(?slot, "dropping decode for detached slot");
            return;
        }
        let index = grid.arena_index(slot);
        if imp.load_tokens.borrow().get(index).copied() != Some(token) {
            trace!(?slot, "dropping stale decode");
            return;
        }
        let Some(texture) = texture else {
            debug!(path = ?item.path, "decode failed, slot left as-is");
            return;
        };

        grid.hide(slot);
        let pictures = imp.pictures.borrow();
        let picture = &pictures[index];
        picture.set_paintable(Some(texture));
        grid.set_content(slot, item);
        grid.show(slot);
        picture.set_visible(true);
    }

    /// True once every slot ever allocated has shown something.
    pub fn all_slots_assigned(&self) -> bool {
        self.imp()
            .grid
            .borrow()
            .as_ref()
            .map(|grid| grid.all_slots_assigned())
            .unwrap_or(false)
    }
}

impl Default for WallWidget {
    fn default() -> Self {
        Self::new()
    }
}
