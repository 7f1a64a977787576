use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use quill_config::ViewportConfig;
use quill_domain::{DiagramId, Point, Size};
use regex::Regex;

lazy_static! {
    static ref SVG_TAG: Regex = Regex::new(r"<svg\b[^>]*>").unwrap();
    static ref WIDTH: Regex = Regex::new(r#"(?:^|\s)width="([0-9]*\.?[0-9]+)(?:px)?""#).unwrap();
    static ref HEIGHT: Regex =
        Regex::new(r#"(?:^|\s)height="([0-9]*\.?[0-9]+)(?:px)?""#).unwrap();
    static ref VIEW_BOX: Regex = Regex::new(r#"viewBox="([^"]+)""#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Combined translate and scale applied to a graphic, displayed in CSS
/// transform syntax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Point,
    pub scale: f64,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

/// Pan and zoom state of one diagram instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PanZoom {
    pub scale: f64,
    pub translate: Point,
    /// Pointer position minus translation at the start of a drag.
    pub drag_origin: Option<Point>,
    pub container: Option<Size>,
    pub graphic: Option<Size>,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::default(),
            drag_origin: None,
            container: None,
            graphic: None,
        }
    }
}

impl PanZoom {
    pub fn transform(&self) -> Transform {
        Transform { translate: self.translate, scale: self.scale }
    }

    pub fn is_panning(&self) -> bool {
        self.drag_origin.is_some()
    }
}

/// Owns the pan/zoom state of every interactive diagram. Operations on an id
/// that was never fitted are ignored.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    states: HashMap<DiagramId, PanZoom>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config, states: HashMap::new() }
    }

    /// Scales the graphic down to fit its container, never above 100%, and
    /// centres it. Empty sizes leave any existing state untouched.
    pub fn fit_to_container(
        &mut self,
        id: DiagramId,
        container: Size,
        graphic: Size,
    ) -> Option<Transform> {
        if container.is_empty() || graphic.is_empty() {
            return None;
        }

        let padding = self.config.fit_padding_px;
        let fit = ((container.width - padding) / graphic.width)
            .min((container.height - padding) / graphic.height)
            .min(1.0);
        let scale = self.clamp(fit);

        let state = self.states.entry(id).or_default();
        state.scale = scale;
        state.translate = Point::default();
        state.container = Some(container);
        state.graphic = Some(graphic);
        Some(state.transform())
    }

    /// Multiplies the scale by `factor`, keeping `pivot` (relative to the
    /// graphic's current centre) in place. A factor that is not finite and
    /// positive, or a non-finite pivot, changes nothing and yields `None`.
    pub fn zoom(&mut self, id: DiagramId, factor: f64, pivot: Point) -> Option<Transform> {
        if !usable_factor(factor) || !pivot.x.is_finite() || !pivot.y.is_finite() {
            return None;
        }
        let (min, max) = (self.config.min_scale, self.config.max_scale);
        let state = self.states.get_mut(&id)?;

        let scale = (state.scale * factor).clamp(min, max);
        let change = scale / state.scale - 1.0;
        state.translate.x -= pivot.x * change;
        state.translate.y -= pivot.y * change;
        state.scale = scale;
        Some(state.transform())
    }

    /// Positive `delta_y` (scrolling down) zooms out.
    pub fn wheel(&mut self, id: DiagramId, delta_y: f64, pivot: Point) -> Option<Transform> {
        let intensity = self.config.wheel_intensity;
        let factor = if delta_y > 0.0 { 1.0 - intensity } else { 1.0 + intensity };
        self.zoom(id, factor, pivot)
    }

    pub fn zoom_in(&mut self, id: DiagramId) -> Option<Transform> {
        let step = self.config.zoom_step;
        self.scale_by(id, step)
    }

    pub fn zoom_out(&mut self, id: DiagramId) -> Option<Transform> {
        let step = 2.0 - self.config.zoom_step;
        self.scale_by(id, step)
    }

    /// Starts a drag. Only the primary button pans.
    pub fn begin_pan(&mut self, id: DiagramId, pointer: Point, button: PointerButton) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        let Some(state) = self.states.get_mut(&id) else {
            return false;
        };
        state.drag_origin = Some(Point::new(
            pointer.x - state.translate.x,
            pointer.y - state.translate.y,
        ));
        true
    }

    pub fn pan_to(&mut self, id: DiagramId, pointer: Point) -> Option<Transform> {
        let state = self.states.get_mut(&id)?;
        let origin = state.drag_origin?;
        state.translate = Point::new(pointer.x - origin.x, pointer.y - origin.y);
        Some(state.transform())
    }

    pub fn end_pan(&mut self, id: DiagramId) {
        if let Some(state) = self.states.get_mut(&id) {
            state.drag_origin = None;
        }
    }

    /// Fits again using the last known sizes.
    pub fn reset(&mut self, id: DiagramId) -> Option<Transform> {
        let state = self.states.get(&id)?;
        let (container, graphic) = (state.container?, state.graphic?);
        self.fit_to_container(id, container, graphic)
    }

    pub fn transform(&self, id: DiagramId) -> Option<Transform> {
        self.states.get(&id).map(PanZoom::transform)
    }

    pub fn state(&self, id: DiagramId) -> Option<&PanZoom> {
        self.states.get(&id)
    }

    pub fn remove(&mut self, id: DiagramId) -> Option<PanZoom> {
        self.states.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn scale_by(&mut self, id: DiagramId, factor: f64) -> Option<Transform> {
        if !usable_factor(factor) {
            return None;
        }
        let (min, max) = (self.config.min_scale, self.config.max_scale);
        let state = self.states.get_mut(&id)?;
        state.scale = (state.scale * factor).clamp(min, max);
        Some(state.transform())
    }

    fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }
}

/// Intrinsic size of graphic markup, from its `width`/`height` attributes or,
/// failing that, its `viewBox`.
pub fn graphic_size(svg: &str) -> Option<Size> {
    let tag = SVG_TAG.find(svg)?.as_str();

    let attr = |re: &Regex| -> Option<f64> { re.captures(tag)?.get(1)?.as_str().parse().ok() };
    if let (Some(width), Some(height)) = (attr(&WIDTH), attr(&HEIGHT)) {
        let size = Size::new(width, height);
        if !size.is_empty() {
            return Some(size);
        }
    }

    let view_box = VIEW_BOX.captures(tag)?.get(1)?.as_str();
    let values: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [_, _, width, height] => Some(Size::new(*width, *height)).filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn usable_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id() -> DiagramId {
        DiagramId::new(1)
    }

    fn fitted() -> ViewportController {
        let mut controller = ViewportController::new(ViewportConfig::default());
        controller.fit_to_container(id(), Size::new(816.0, 416.0), Size::new(400.0, 200.0));
        controller
    }

    #[test]
    fn test_fit_never_upscales() {
        let fixture = fitted();

        let actual = fixture.transform(id()).unwrap();
        let expected = Transform { translate: Point::default(), scale: 1.0 };

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_fit_scales_down_to_tightest_side() {
        let mut fixture = ViewportController::new(ViewportConfig::default());

        let actual = fixture
            .fit_to_container(id(), Size::new(216.0, 1016.0), Size::new(400.0, 200.0))
            .unwrap();

        assert_eq!(actual.scale, 0.5);
    }

    #[test]
    fn test_fit_ignores_empty_sizes() {
        let mut fixture = fitted();
        fixture.zoom_in(id());
        let before = fixture.transform(id());

        let actual = fixture.fit_to_container(id(), Size::new(0.0, 400.0), Size::new(10.0, 10.0));

        assert_eq!(actual, None);
        assert_eq!(fixture.transform(id()), before);
    }

    #[test]
    fn test_zoom_keeps_pivot_stationary() {
        let mut fixture = fitted();

        let actual = fixture.zoom(id(), 2.0, Point::new(10.0, -20.0)).unwrap();
        let expected = Transform { translate: Point::new(-10.0, 20.0), scale: 2.0 };

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut fixture = fitted();

        let actual = fixture.zoom(id(), 100.0, Point::default()).unwrap();
        assert_eq!(actual.scale, 12.0);

        let actual = fixture.zoom(id(), 0.0001, Point::default()).unwrap();
        assert_eq!(actual.scale, 0.1);

        for _ in 0..200 {
            fixture.zoom_out(id());
        }
        assert_eq!(fixture.transform(id()).unwrap().scale, 0.1);
    }

    #[test]
    fn test_zoom_ignores_unusable_factor() {
        let mut fixture = fitted();
        let before = fixture.transform(id());

        for factor in [f64::NAN, f64::INFINITY, 0.0, -2.0] {
            assert_eq!(fixture.zoom(id(), factor, Point::default()), None);
        }
        assert_eq!(fixture.zoom(id(), 2.0, Point::new(f64::NAN, 0.0)), None);

        assert_eq!(fixture.transform(id()), before);
    }

    #[test]
    fn test_wheel_direction() {
        let mut fixture = fitted();

        let actual = fixture.wheel(id(), 120.0, Point::default()).unwrap();
        assert_eq!(actual.scale, 0.99);

        let actual = fixture.wheel(id(), -120.0, Point::default()).unwrap();
        assert_eq!(actual.scale, 0.99 * 1.01);
    }

    #[test]
    fn test_zoom_buttons() {
        let mut fixture = fitted();

        assert_eq!(fixture.zoom_in(id()).unwrap().scale, 1.1);
        fixture.reset(id());
        assert_eq!(fixture.zoom_out(id()).unwrap().scale, 2.0 - 1.1);
    }

    #[test]
    fn test_pan_follows_pointer() {
        let mut fixture = fitted();

        assert!(fixture.begin_pan(id(), Point::new(100.0, 100.0), PointerButton::Primary));
        let actual = fixture.pan_to(id(), Point::new(130.0, 90.0)).unwrap();
        fixture.end_pan(id());

        assert_eq!(actual.translate, Point::new(30.0, -10.0));
        assert_eq!(fixture.pan_to(id(), Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_pan_requires_primary_button() {
        let mut fixture = fitted();

        assert!(!fixture.begin_pan(id(), Point::new(1.0, 1.0), PointerButton::Secondary));
        assert_eq!(fixture.pan_to(id(), Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_reset_refits() {
        let mut fixture = fitted();
        fixture.zoom(id(), 3.0, Point::new(50.0, 50.0));
        fixture.begin_pan(id(), Point::default(), PointerButton::Primary);
        fixture.pan_to(id(), Point::new(40.0, 40.0));

        let actual = fixture.reset(id()).unwrap();
        let expected = Transform { translate: Point::default(), scale: 1.0 };

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut fixture = ViewportController::new(ViewportConfig::default());

        assert_eq!(fixture.zoom_in(id()), None);
        assert_eq!(fixture.reset(id()), None);
        assert!(fixture.is_empty());
    }

    #[test]
    fn test_transform_display() {
        let fixture = Transform { translate: Point::new(12.5, -4.0), scale: 0.5 };

        let actual = fixture.to_string();
        let expected = "translate(12.5px, -4px) scale(0.5)";

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_graphic_size_from_attributes() {
        let fixture = r#"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="180px" viewBox="0 0 10 10"><rect stroke-width="2"/></svg>"#;

        let actual = graphic_size(fixture);
        let expected = Some(Size::new(320.0, 180.0));

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_graphic_size_from_view_box() {
        let fixture = r#"<svg id="m1" width="100%" style="max-width: 640px;" viewBox="-8 -8 640.5 312">"#;

        let actual = graphic_size(fixture);
        let expected = Some(Size::new(640.5, 312.0));

        assert_eq!(actual, expected);
        assert_eq!(graphic_size("<div>not a graphic</div>"), None);
    }
}
