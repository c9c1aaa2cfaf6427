//! Session state and the action dispatcher.
//!
//! All mutation goes through [`Session::dispatch`]. The style is always
//! rebuilt as `preset.merged(overrides)`, so a preset is a merge source and
//! never a separate editing mode.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::content::{self, ContentFields, ContentType};
use crate::error::{ExportError, QrStudioError, StyleError};
use crate::export::{ExportArtifact, Exporter, ShareSink};
use crate::matrix::{QrCodeGenEncoder, SymbolEncoder};
use crate::presets::{self, Preset};
use crate::scheduler::{RenderRequest, RenderScheduler, RequestSeq, SchedulerState};
use crate::style::{StyleOverrides, StyleSpec};
use crate::surface::{Surface, SurfaceRenderer};
use crate::RenderOptions;

/// A user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch content type; clears fields and any pending render.
    SelectType(ContentType),
    SetField { name: String, value: String },
    /// Layer partial style edits over the current ones.
    EditStyle(StyleOverrides),
    /// Rebase onto a named preset and drop earlier style edits.
    ApplyPreset(String),
    SetFrameEnabled(bool),
    /// Clock advance; fires the debounce timer when due.
    Tick,
}

pub struct Session {
    content_type: ContentType,
    fields: ContentFields,
    preset: Preset,
    overrides: StyleOverrides,
    scheduler: RenderScheduler,
    renderer: SurfaceRenderer,
    exporter: Exporter,
    encoder: Box<dyn SymbolEncoder>,
    surface: Surface,
}

impl Session {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_encoder(options, Box::new(QrCodeGenEncoder))
    }

    pub fn with_encoder(options: RenderOptions, encoder: Box<dyn SymbolEncoder>) -> Self {
        let preset = presets::default_preset();
        Self {
            content_type: ContentType::Text,
            fields: ContentFields::new(),
            scheduler: RenderScheduler::new(options.debounce(), preset.spec.clone()),
            preset,
            overrides: StyleOverrides::default(),
            renderer: SurfaceRenderer::new(options.clone()),
            exporter: Exporter::new(options),
            encoder,
            surface: Surface::Placeholder,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn fields(&self) -> &ContentFields {
        &self.fields
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn overrides(&self) -> &StyleOverrides {
        &self.overrides
    }

    /// The effective, fully populated style.
    pub fn style(&self) -> StyleSpec {
        self.preset.spec.merged(&self.overrides)
    }

    pub fn payload(&self) -> String {
        content::format(self.content_type, &self.fields)
    }

    pub fn summary(&self) -> String {
        content::summary(self.content_type, &self.fields)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Download and share controls are enabled only with a drawn surface.
    pub fn can_export(&self) -> bool {
        self.surface.is_ready()
    }

    /// Apply one action at `now`. Returns the render request it triggered,
    /// if any; the caller renders it with [`Session::render`] and hands the
    /// result back through [`Session::apply_render`].
    pub fn dispatch(
        &mut self,
        action: Action,
        now: Instant,
    ) -> Result<Option<RenderRequest>, StyleError> {
        debug!(?action, "dispatch");
        let request = match action {
            Action::SelectType(content_type) => {
                if content_type != self.content_type {
                    info!(from = %self.content_type, to = %content_type, "content type changed");
                    self.content_type = content_type;
                    self.fields.clear();
                    self.scheduler.reset();
                    self.surface = Surface::Placeholder;
                }
                None
            }
            Action::SetField { name, value } => {
                self.fields.insert(name, value);
                let payload = self.payload();
                if !self.scheduler.payload_changed(self.content_type, &payload, now) {
                    self.surface = Surface::Placeholder;
                }
                None
            }
            Action::EditStyle(edit) => {
                self.overrides.layer(&edit);
                self.scheduler.style_changed(self.style())
            }
            Action::ApplyPreset(name) => {
                let preset = presets::get_preset(&name).ok_or(StyleError::UnknownPreset(name))?;
                info!(preset = preset.name, "preset applied");
                self.preset = preset;
                self.overrides = StyleOverrides::default();
                self.scheduler.style_changed(self.style())
            }
            Action::SetFrameEnabled(enabled) => {
                self.overrides.frame.enabled = Some(enabled);
                self.scheduler.style_changed(self.style())
            }
            Action::Tick => self.scheduler.poll(now),
        };
        Ok(request)
    }

    /// Encode and draw `request`. Encoder rejections degrade to the
    /// placeholder; the style is left as it was.
    pub fn render(&self, request: &RenderRequest) -> Surface {
        match self
            .renderer
            .render_payload(self.encoder.as_ref(), &request.payload, &request.style)
        {
            Ok(surface) => surface,
            Err(e) => {
                warn!(seq = request.seq, error = %e, "encode failed; showing placeholder");
                Surface::Placeholder
            }
        }
    }

    /// Install a finished render unless a newer request has been issued
    /// since. Returns whether it was applied.
    pub fn apply_render(&mut self, seq: RequestSeq, surface: Surface) -> bool {
        if !self.scheduler.is_latest(seq) {
            debug!(seq, "discarding superseded render");
            return false;
        }
        self.surface = surface;
        true
    }

    /// Dispatch and render synchronously.
    pub fn handle(&mut self, action: Action, now: Instant) -> Result<(), QrStudioError> {
        if let Some(request) = self.dispatch(action, now)? {
            let surface = self.render(&request);
            self.apply_render(request.seq, surface);
        }
        Ok(())
    }

    /// Run the pending debounce, if any, to completion.
    pub fn settle(&mut self) -> Result<(), QrStudioError> {
        match self.next_deadline() {
            Some(deadline) => self.handle(Action::Tick, deadline),
            None => Ok(()),
        }
    }

    /// Style the preview was drawn with. Exports use it rather than the
    /// current session style so a render still in flight cannot make them
    /// disagree with what is on screen.
    fn preview_style(&self) -> Result<&StyleSpec, ExportError> {
        self.surface
            .rendered()
            .map(|r| &r.style)
            .ok_or(ExportError::NoContent)
    }

    pub fn export_raster(&self) -> Result<ExportArtifact, ExportError> {
        let style = self.preview_style()?;
        self.exporter
            .raster_artifact(&self.surface, style, self.content_type)
    }

    pub fn export_vector(&self) -> Result<ExportArtifact, ExportError> {
        let style = self.preview_style()?;
        self.exporter
            .vector_artifact(&self.surface, style, self.content_type)
    }

    pub fn export_print(&self) -> Result<ExportArtifact, ExportError> {
        let style = self.preview_style()?;
        self.exporter
            .print_artifact(&self.surface, style, self.content_type, &self.summary())
    }

    /// Share the PNG export. With no sink this reports `false` even before
    /// anything is rendered.
    pub fn share(&self, sink: Option<&mut dyn ShareSink>) -> Result<bool, ExportError> {
        match sink {
            None => self
                .exporter
                .share_raster(None, &self.surface, &self.style(), self.content_type),
            Some(sink) => {
                let style = self.preview_style()?;
                self.exporter
                    .share_raster(Some(sink), &self.surface, style, self.content_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::style::Rgb;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session() -> Session {
        Session::new(RenderOptions { size: 100, ..Default::default() })
    }

    fn set(name: &str, value: &str) -> Action {
        Action::SetField { name: name.to_string(), value: value.to_string() }
    }

    #[test]
    fn test_field_edit_renders_after_debounce() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(Action::SelectType(ContentType::Url), t0).unwrap();
        s.handle(set("url", "https://rust-lang.org"), t0).unwrap();
        assert!(!s.can_export());
        s.handle(Action::Tick, t0 + ms(499)).unwrap();
        assert!(!s.can_export());
        s.handle(Action::Tick, t0 + ms(500)).unwrap();
        assert!(s.can_export());
    }

    #[test]
    fn test_color_edit_updates_without_waiting() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(set("text", "hello"), t0).unwrap();
        s.settle().unwrap();

        let mut edit = StyleOverrides::default();
        edit.module.color = Some(Rgb(200, 0, 0));
        s.handle(Action::EditStyle(edit), t0 + ms(600)).unwrap();
        let rendered = s.surface().rendered().unwrap();
        assert_eq!(rendered.style.module.color, Rgb(200, 0, 0));
    }

    #[test]
    fn test_switching_type_clears_fields_and_surface() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(set("text", "hello"), t0).unwrap();
        s.settle().unwrap();
        assert!(s.can_export());

        s.handle(Action::SelectType(ContentType::Email), t0 + ms(700)).unwrap();
        assert!(s.fields().is_empty());
        assert!(!s.can_export());
        assert_eq!(s.scheduler_state(), SchedulerState::Idle);
        assert_eq!(s.payload(), "mailto:");
    }

    #[test]
    fn test_stale_render_is_discarded() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(set("text", "one"), t0).unwrap();
        let first = s.dispatch(Action::Tick, t0 + ms(500)).unwrap().unwrap();
        let second = s
            .dispatch(Action::ApplyPreset("ocean".to_string()), t0 + ms(510))
            .unwrap()
            .unwrap();

        let newer = s.render(&second);
        assert!(s.apply_render(second.seq, newer));
        let older = s.render(&first);
        assert!(!s.apply_render(first.seq, older));
        assert_eq!(s.surface().rendered().unwrap().style, presets::ocean().spec);
    }

    #[test]
    fn test_frame_toggle_keeps_other_frame_fields() {
        let t0 = Instant::now();
        let mut s = session();
        let mut edit = StyleOverrides::default();
        edit.frame.text = Some("Menu".to_string());
        edit.frame.border_color = Some(Rgb(1, 2, 3));
        s.handle(Action::EditStyle(edit), t0).unwrap();

        s.handle(Action::SetFrameEnabled(true), t0).unwrap();
        let on = s.style();
        s.handle(Action::SetFrameEnabled(false), t0).unwrap();
        assert!(!s.style().frame.enabled);
        s.handle(Action::SetFrameEnabled(true), t0).unwrap();
        assert_eq!(s.style(), on);
        assert_eq!(s.style().frame.text, "Menu");
    }

    #[test]
    fn test_apply_preset_resets_overrides() {
        let t0 = Instant::now();
        let mut s = session();
        let mut edit = StyleOverrides::default();
        edit.background = Some(Rgb(9, 9, 9));
        s.handle(Action::EditStyle(edit), t0).unwrap();
        s.handle(Action::ApplyPreset("sunset".to_string()), t0).unwrap();
        assert!(s.overrides().is_empty());
        assert_eq!(s.style(), presets::sunset().spec);

        let err = s.handle(Action::ApplyPreset("neon".to_string()), t0).unwrap_err();
        assert!(matches!(
            err,
            QrStudioError::Style(StyleError::UnknownPreset(ref name)) if name == "neon"
        ));
        assert_eq!(s.preset().name, "sunset");
    }

    /// Refuses anything longer than 30 bytes.
    struct ShortOnlyEncoder;

    impl SymbolEncoder for ShortOnlyEncoder {
        fn encode(
            &self,
            payload: &str,
            level: crate::matrix::EcLevel,
        ) -> Result<crate::matrix::Matrix, crate::error::EncodeError> {
            if payload.len() > 30 {
                return Err(crate::error::EncodeError::Rejected("too long".to_string()));
            }
            QrCodeGenEncoder.encode(payload, level)
        }
    }

    #[test]
    fn test_encoder_rejection_falls_back_to_placeholder() {
        let t0 = Instant::now();
        let mut s = Session::with_encoder(
            RenderOptions { size: 100, ..Default::default() },
            Box::new(ShortOnlyEncoder),
        );
        s.handle(set("text", "short"), t0).unwrap();
        s.settle().unwrap();
        assert!(s.can_export());
        let style_before = s.style();

        s.handle(set("text", &"x".repeat(31)), t0 + ms(600)).unwrap();
        s.settle().unwrap();
        assert!(matches!(s.surface(), Surface::Placeholder));
        assert!(!s.can_export());
        assert!(matches!(s.export_vector(), Err(ExportError::NoContent)));
        assert_eq!(s.style(), style_before);
    }

    #[test]
    fn test_export_matches_preview_until_render_applied() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(set("text", "hello"), t0).unwrap();
        s.settle().unwrap();

        let mut edit = StyleOverrides::default();
        edit.background = Some(Rgb(1, 2, 3));
        let request = s.dispatch(Action::EditStyle(edit), t0 + ms(600)).unwrap();
        assert!(request.is_some());
        assert_eq!(s.style().background, Rgb(1, 2, 3));

        let svg = String::from_utf8(s.export_vector().unwrap().bytes).unwrap();
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(!svg.contains("#010203"));
        let png = s.export_raster().unwrap().bytes;
        let img = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_unready_edit_drops_prior_surface() {
        let t0 = Instant::now();
        let mut s = session();
        s.handle(Action::SelectType(ContentType::Phone), t0).unwrap();
        s.handle(set("phone", "5551234"), t0).unwrap();
        s.settle().unwrap();
        assert!(s.can_export());
        s.handle(set("phone", "555"), t0 + ms(900)).unwrap();
        assert!(!s.can_export());
        assert!(matches!(s.export_raster(), Err(ExportError::NoContent)));
    }
}
