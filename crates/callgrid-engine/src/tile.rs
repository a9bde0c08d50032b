use callgrid_core::{CameraSwitchMode, LocalMediaState, Participant, TileId, VideoStream};
use callgrid_renderer::{TileView, TileViewFactory};

/// Inputs shared by every tile refresh of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderContext {
    /// The display set was collapsed to a single screen-sharing participant.
    pub screen_share: bool,
    /// Video is suspended while the app is in the background.
    pub video_suspended: bool,
}

// ── TileState ─────────────────────────────────────────────────────────────────

/// Everything a tile's view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileState {
    pub display_name:  String,
    pub muted:         bool,
    pub speaking:      bool,
    pub stream:        Option<VideoStream>,
    pub label_visible: bool,
    /// Only the local tile carries a camera-switch control.
    pub camera_mode:   Option<CameraSwitchMode>,
}

impl TileState {
    pub fn remote(participant: &Participant, ctx: RenderContext) -> Self {
        let stream = if ctx.video_suspended {
            None
        } else {
            participant.preferred_stream(ctx.screen_share).cloned()
        };
        Self {
            display_name:  participant.display_name.clone(),
            muted:         participant.is_muted,
            speaking:      participant.is_speaking,
            stream,
            label_visible: true,
            camera_mode:   None,
        }
    }

    pub fn local(
        display_name: &str,
        media: LocalMediaState,
        label_visible: bool,
        camera_mode: CameraSwitchMode,
        ctx: RenderContext,
    ) -> Self {
        let stream = (media.camera_enabled && !ctx.video_suspended).then(VideoStream::local_camera);
        Self {
            display_name: display_name.to_owned(),
            muted: media.is_muted,
            speaking: false,
            stream,
            label_visible,
            camera_mode: Some(camera_mode),
        }
    }
}

// ── Tile ──────────────────────────────────────────────────────────────────────

/// Renderable unit for one participant. Exclusively owned by the engine.
pub struct Tile {
    id:       TileId,
    view:     Box<dyn TileView>,
    rendered: Option<TileState>,
    disposed: bool,
}

impl Tile {
    pub fn id(&self) -> TileId {
        self.id
    }

    /// State last pushed to the view, `None` before the first refresh.
    pub fn state(&self) -> Option<&TileState> {
        self.rendered.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Pushes `next` to the view, touching only the fields that changed.
    pub fn refresh(&mut self, next: TileState) {
        let prev = self.rendered.take();
        let prev = prev.as_ref();

        if prev.map(|p| &p.display_name) != Some(&next.display_name) {
            self.view.set_display_name(&next.display_name);
        }
        if prev.map(|p| p.muted) != Some(next.muted) {
            self.view.set_muted(next.muted);
        }
        if prev.map(|p| p.speaking) != Some(next.speaking) {
            self.view.set_speaking(next.speaking);
        }
        if prev.map(|p| &p.stream) != Some(&next.stream) {
            self.view.set_video_stream(next.stream.as_ref());
        }
        if prev.map(|p| p.label_visible) != Some(next.label_visible) {
            self.view.set_name_label_visible(next.label_visible);
        }
        if let Some(mode) = next.camera_mode {
            if prev.and_then(|p| p.camera_mode) != Some(mode) {
                self.view.set_camera_switch_mode(mode);
            }
        }

        self.rendered = Some(next);
    }

    /// Releases the view's media resources. Safe to call more than once.
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.view.dispose();
        }
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("id", &self.id)
            .field("rendered", &self.rendered)
            .field("disposed", &self.disposed)
            .finish()
    }
}

// ── TileMaker ─────────────────────────────────────────────────────────────────

/// Allocates tiles with never-reused handles.
pub struct TileMaker {
    views:   Box<dyn TileViewFactory>,
    next_id: u64,
}

impl TileMaker {
    pub fn new(views: Box<dyn TileViewFactory>) -> Self {
        Self { views, next_id: 0 }
    }

    pub fn make(&mut self) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile { id, view: self.views.create_view(id), rendered: None, disposed: false }
    }

    /// Number of tiles created so far.
    pub fn created(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use callgrid_renderer::TracingViewFactory;

    /// Records the name of every setter call.
    #[derive(Clone, Default)]
    struct RecordingViews {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecordingViews {
        fn take(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.calls.lock().expect("calls lock"))
        }
    }

    struct RecordingView {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecordingView {
        fn record(&self, call: &'static str) {
            self.calls.lock().expect("calls lock").push(call);
        }
    }

    impl TileView for RecordingView {
        fn set_display_name(&mut self, _name: &str) {
            self.record("display_name");
        }
        fn set_muted(&mut self, _muted: bool) {
            self.record("muted");
        }
        fn set_speaking(&mut self, _speaking: bool) {
            self.record("speaking");
        }
        fn set_video_stream(&mut self, _stream: Option<&VideoStream>) {
            self.record("video_stream");
        }
        fn set_name_label_visible(&mut self, _visible: bool) {
            self.record("label_visible");
        }
        fn set_camera_switch_mode(&mut self, _mode: CameraSwitchMode) {
            self.record("camera_mode");
        }
        fn dispose(&mut self) {
            self.record("dispose");
        }
    }

    impl TileViewFactory for RecordingViews {
        fn create_view(&mut self, _tile: TileId) -> Box<dyn TileView> {
            Box::new(RecordingView { calls: Arc::clone(&self.calls) })
        }
    }

    #[test]
    fn first_refresh_sets_every_field() {
        let views = RecordingViews::default();
        let mut tile = TileMaker::new(Box::new(views.clone())).make();

        let media = LocalMediaState { is_muted: false, camera_enabled: true };
        tile.refresh(TileState::local("Me", media, true, CameraSwitchMode::MultiParty, RenderContext::default()));
        assert_eq!(
            views.take(),
            vec!["display_name", "muted", "speaking", "video_stream", "label_visible", "camera_mode"]
        );
    }

    #[test]
    fn refresh_pushes_only_changed_fields() {
        let views = RecordingViews::default();
        let mut tile = TileMaker::new(Box::new(views.clone())).make();
        let mut p = Participant::new("a", "Ada").with_stream(VideoStream::camera("cam-a"));
        tile.refresh(TileState::remote(&p, RenderContext::default()));
        views.take();

        tile.refresh(TileState::remote(&p, RenderContext::default()));
        assert!(views.take().is_empty());

        p.is_muted = true;
        tile.refresh(TileState::remote(&p, RenderContext::default()));
        assert_eq!(views.take(), vec!["muted"]);

        let suspended = RenderContext { screen_share: false, video_suspended: true };
        tile.refresh(TileState::remote(&p, suspended));
        assert_eq!(views.take(), vec!["video_stream"]);
    }

    #[test]
    fn refresh_records_state_and_dispose_is_idempotent() {
        let views = TracingViewFactory::new();
        let mut maker = TileMaker::new(Box::new(views.clone()));
        let mut tile = maker.make();
        assert!(tile.state().is_none());

        let p = Participant::new("a", "Ada").with_stream(VideoStream::camera("cam-a"));
        tile.refresh(TileState::remote(&p, RenderContext::default()));
        assert_eq!(tile.state().map(|s| s.display_name.as_str()), Some("Ada"));

        tile.dispose();
        tile.dispose();
        assert!(tile.is_disposed());
        assert_eq!(views.live_views(), 0);
    }

    #[test]
    fn suspended_video_detaches_stream() {
        let p = Participant::new("a", "Ada").with_stream(VideoStream::camera("cam-a"));
        let ctx = RenderContext { screen_share: false, video_suspended: true };
        assert_eq!(TileState::remote(&p, ctx).stream, None);

        let media = LocalMediaState { is_muted: true, camera_enabled: true };
        let local = TileState::local("Me", media, false, CameraSwitchMode::OneOnOne, RenderContext::default());
        assert_eq!(local.stream, Some(VideoStream::local_camera()));
        assert!(local.muted);
    }

    #[test]
    fn handles_are_never_reused() {
        let mut maker = TileMaker::new(Box::new(TracingViewFactory::new()));
        let a = maker.make().id();
        let b = maker.make().id();
        assert_ne!(a, b);
        assert_eq!(maker.created(), 2);
    }
}
