//! Situation plan (sitplan) overlay resolution.
//!
//! Tree documents point sitplan layers at elements by reference label
//! (`ref: A.3`) or raw identifier (`id: 17`), and keep raster images as
//! files next to the document. Packed documents point at elements by
//! identifier only and embed images as base64 data URLs inside an SVG
//! snippet. This module translates in both directions.
//!
//! Layers are read leniently on export: a malformed number is reported and
//! replaced by its default instead of failing the conversion.

use std::{io, sync::LazyLock};

use base64::{Engine, engine::general_purpose::STANDARD};
use indexmap::IndexMap;
use log::{debug, trace};
use regex::Regex;
use serde_json::{Map, Value};

use eds_core::{
    circuit::LabelMap,
    packed::{Sitplan, SitplanDefaults, SitplanEntry},
    tree::{
        ElementLayer, ImageLayer, ImageSource, Layer, LayerDefaults, LayerTarget, TreeSitplan,
    },
};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode};

/// Side length of an unscaled symbol.
const SYMBOL_SIZE: f64 = 200.0;
const DEFAULT_IMAGE_SIZE: [f64; 2] = [200.0, 200.0];
const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_ADDRESS_LOCATION: &str = "rechts";
const AUTO_ADDRESS: &str = "auto";

/// Embedded raster payload inside a sitplan SVG snippet.
static EMBEDDED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data:image/(png|jpeg|jpg);base64,([A-Za-z0-9+/=]+)").expect("valid regex")
});

/// Layer defaults used when a tree document has a sitplan section that
/// leaves them out.
const SECTION_DEFAULTS: SitplanDefaults = SitplanDefaults {
    fontsize: 10.0,
    scale: 0.25,
    rotate: 0.0,
};

/// Storage for the image files of a tree document.
///
/// Export reads images through it, import writes extracted images to it.
pub trait AssetStore {
    /// Reads asset `name`, returning `None` when it does not exist.
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Writes asset `name`, replacing any previous content.
    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// An asset store held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryAssets {
    files: IndexMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset, returning `self` for chaining.
    pub fn with_file(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.into(), bytes.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl AssetStore for MemoryAssets {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).cloned())
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Converts the tree sitplan section into the packed sitplan.
///
/// Without a section the packed sitplan is empty with the editor's own
/// defaults.
pub(crate) fn export_sitplan(
    section: Option<&TreeSitplan>,
    labels: &LabelMap,
    assets: Option<&dyn AssetStore>,
    collector: &mut DiagnosticCollector,
) -> Sitplan {
    let Some(section) = section else {
        debug!("No sitplan section, writing empty sitplan");
        return Sitplan::default();
    };

    let defaults = SitplanDefaults {
        fontsize: section.defaults.fontsize.unwrap_or(SECTION_DEFAULTS.fontsize),
        scale: section.defaults.scale.unwrap_or(SECTION_DEFAULTS.scale),
        rotate: section.defaults.rotate.unwrap_or(SECTION_DEFAULTS.rotate),
    };

    let mut elements = Vec::new();
    for (index, value) in section.layer_values().iter().enumerate() {
        let Some(layer) = value.as_object() else {
            collector.emit(
                Diagnostic::warning(format!("sitplan layer {index} is not a mapping"))
                    .with_code(ErrorCode::E202)
                    .with_subject(format!("layers[{index}]"))
                    .with_help("the layer was dropped"),
            );
            continue;
        };
        let reader = LayerReader { layer, index };

        let entry = if layer.contains_key("image") {
            Some(reader.image_entry(&defaults, assets, collector))
        } else {
            reader.element_entry(&defaults, labels, collector)
        };
        if let Some(entry) = entry {
            elements.push(entry);
        }
    }

    debug!(
        layers = section.layer_values().len(),
        kept = elements.len();
        "Sitplan exported"
    );

    Sitplan {
        num_pages: section.num_pages.unwrap_or(1),
        active_page: section.active_page.unwrap_or(1),
        defaults,
        elements,
    }
}

/// Lenient accessor over one layer mapping.
struct LayerReader<'a> {
    layer: &'a Map<String, Value>,
    index: usize,
}

impl LayerReader<'_> {
    fn element_entry(
        &self,
        defaults: &SitplanDefaults,
        labels: &LabelMap,
        collector: &mut DiagnosticCollector,
    ) -> Option<SitplanEntry> {
        let reference = self
            .layer
            .get("ref")
            .and_then(Value::as_str)
            .filter(|reference| !reference.is_empty());

        let target = if let Some(reference) = reference {
            match labels.id_for(reference) {
                Some(id) => id,
                None => {
                    collector.emit(
                        Diagnostic::warning(format!(
                            "sitplan reference `{reference}` does not match any element"
                        ))
                        .with_code(ErrorCode::E200)
                        .with_subject(reference)
                        .with_help("the layer was dropped"),
                    );
                    return None;
                }
            }
        } else if let Some(id) = self.layer.get("id").filter(|id| !id.is_null()) {
            match id.as_u64().filter(|id| *id > 0) {
                Some(id) => id,
                None => {
                    collector.emit(
                        Diagnostic::warning(format!(
                            "sitplan layer {} has an invalid element id `{id}`",
                            self.index
                        ))
                        .with_code(ErrorCode::E202)
                        .with_subject(format!("layers[{}].id", self.index))
                        .with_help("the layer was dropped"),
                    );
                    return None;
                }
            }
        } else {
            collector.emit(
                Diagnostic::warning(format!(
                    "sitplan layer {} has neither `ref` nor `id`",
                    self.index
                ))
                .with_code(ErrorCode::E202)
                .with_subject(format!("layers[{}]", self.index))
                .with_help("the layer was dropped"),
            );
            return None;
        };

        let [posx, posy] = self.pair("pos", [0.0, 0.0], collector);
        let scale = self.number("scale", defaults.scale, collector);
        let sizex = (SYMBOL_SIZE * scale).trunc() + 1.0;
        let sizey = (SYMBOL_SIZE * scale).trunc();
        trace!(layer = self.index, target, posx, posy; "Element layer");

        Some(SitplanEntry {
            page: self.page(collector),
            posx,
            posy,
            sizex,
            sizey,
            labelposx: posx + sizex * 0.2,
            labelposy: posy + 1.0,
            labelfontsize: self.number("labelfontsize", defaults.fontsize, collector),
            adrestype: Some(AUTO_ADDRESS.to_string()),
            adres: None,
            adreslocation: Some(self.text("adreslocation", DEFAULT_ADDRESS_LOCATION)),
            rotate: self.number("rotate", defaults.rotate, collector),
            scale,
            movable: true,
            color: Some(self.text("color", DEFAULT_COLOR)),
            svg: String::new(),
            electro_item_id: Some(target),
            extra: IndexMap::new(),
        })
    }

    fn image_entry(
        &self,
        defaults: &SitplanDefaults,
        assets: Option<&dyn AssetStore>,
        collector: &mut DiagnosticCollector,
    ) -> SitplanEntry {
        let [posx, posy] = self.pair("pos", [0.0, 0.0], collector);
        let size = self.pair("size", DEFAULT_IMAGE_SIZE, collector);

        let svg = match (self.layer.get("image").and_then(Value::as_str), assets) {
            (Some(name), Some(assets)) => self.load_image(name, size, assets, collector),
            (Some(_), None) => String::new(),
            (None, _) => {
                collector.emit(
                    Diagnostic::warning(format!(
                        "image of sitplan layer {} is not a file name",
                        self.index
                    ))
                    .with_code(ErrorCode::E202)
                    .with_subject(format!("layers[{}].image", self.index))
                    .with_help("the layer was kept without an image"),
                );
                String::new()
            }
        };
        trace!(layer = self.index, posx, posy, svg_length = svg.len(); "Image layer");

        SitplanEntry {
            page: self.page(collector),
            posx,
            posy,
            sizex: size[0],
            sizey: size[1],
            labelposx: posx + size[0] * 0.2,
            labelposy: posy + 1.0,
            labelfontsize: defaults.fontsize,
            adrestype: None,
            adres: None,
            adreslocation: Some(DEFAULT_ADDRESS_LOCATION.to_string()),
            rotate: self.number("rotate", defaults.rotate, collector),
            scale: self.number("scale", defaults.scale, collector),
            movable: true,
            color: Some(self.text("color", DEFAULT_COLOR)),
            svg,
            electro_item_id: None,
            extra: IndexMap::new(),
        }
    }

    fn load_image(
        &self,
        name: &str,
        size: [f64; 2],
        assets: &dyn AssetStore,
        collector: &mut DiagnosticCollector,
    ) -> String {
        match assets.read(name) {
            Ok(Some(bytes)) => image_svg(name, &bytes, size),
            Ok(None) => {
                collector.emit(
                    Diagnostic::warning(format!("image file `{name}` not found"))
                        .with_code(ErrorCode::E201)
                        .with_subject(name)
                        .with_help("the layer was kept without an image"),
                );
                String::new()
            }
            Err(err) => {
                collector.emit(
                    Diagnostic::warning(format!("cannot read image file `{name}`: {err}"))
                        .with_code(ErrorCode::E204)
                        .with_subject(name)
                        .with_help("the layer was kept without an image"),
                );
                String::new()
            }
        }
    }

    fn number(&self, key: &str, default: f64, collector: &mut DiagnosticCollector) -> f64 {
        match self.layer.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => number_value(value).unwrap_or_else(|| {
                self.malformed(key, value, &default.to_string(), collector);
                default
            }),
        }
    }

    fn pair(&self, key: &str, default: [f64; 2], collector: &mut DiagnosticCollector) -> [f64; 2] {
        match self.layer.get(key) {
            None | Some(Value::Null) => default,
            Some(value) => {
                let pair = value.as_array().and_then(|items| match items.as_slice() {
                    [x, y] => Some([number_value(x)?, number_value(y)?]),
                    _ => None,
                });
                pair.unwrap_or_else(|| {
                    let fallback = format!("[{}, {}]", default[0], default[1]);
                    self.malformed(key, value, &fallback, collector);
                    default
                })
            }
        }
    }

    fn page(&self, collector: &mut DiagnosticCollector) -> u32 {
        self.number("page", 1.0, collector).round() as u32
    }

    fn text(&self, key: &str, default: &str) -> String {
        self.layer
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn malformed(
        &self,
        key: &str,
        value: &Value,
        fallback: &str,
        collector: &mut DiagnosticCollector,
    ) {
        collector.emit(
            Diagnostic::warning(format!(
                "`{key}` of sitplan layer {} is not numeric: {value}",
                self.index
            ))
            .with_code(ErrorCode::E203)
            .with_subject(format!("layers[{}].{key}", self.index))
            .with_help(format!("using {fallback}")),
        );
    }
}

/// Reads a number, accepting numeric text.
fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Wraps raster bytes into the SVG snippet stored in packed sitplans.
fn image_svg(name: &str, bytes: &[u8], [width, height]: [f64; 2]) -> String {
    let extension = name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "image/png",
    };
    let data = STANDARD.encode(bytes);
    format!(
        r#"<svg width="{width}" height="{height}"><image xlink:href="data:{mime};base64,{data}" width="{width}" height="{height}"/></svg>"#
    )
}

/// Converts the packed sitplan into the tree sitplan section.
///
/// Returns `None` when there are no layers to write.
pub(crate) fn import_sitplan(
    sitplan: Option<&Sitplan>,
    labels: &LabelMap,
    mut assets: Option<&mut dyn AssetStore>,
    collector: &mut DiagnosticCollector,
) -> Option<TreeSitplan> {
    let sitplan = sitplan.filter(|sitplan| !sitplan.elements.is_empty())?;
    let defaults = sitplan.defaults;

    let mut layers = Vec::new();
    let mut image_count = 0;
    for (index, entry) in sitplan.elements.iter().enumerate() {
        let layer = match entry.electro_item_id {
            Some(id) => Layer::Element(element_layer(entry, id, &defaults, labels)),
            None if !entry.svg.is_empty() => {
                let source = match assets.as_deref_mut() {
                    Some(assets) => extract_image(entry, image_count, assets, collector),
                    None => Some(ImageSource::Embedded(entry.svg.chars().count())),
                };
                if matches!(source, Some(ImageSource::File(_))) {
                    image_count += 1;
                }
                Layer::Image(ImageLayer {
                    pos: [round1(entry.posx), round1(entry.posy)],
                    size: [entry.sizex, entry.sizey],
                    source,
                    scale: (entry.scale != defaults.scale).then_some(entry.scale),
                    rotate: (entry.rotate != defaults.rotate).then_some(entry.rotate),
                    page: (entry.page != 1).then_some(entry.page),
                })
            }
            None => {
                trace!(entry = index; "Skipping sitplan entry without element or image");
                continue;
            }
        };

        match serde_json::to_value(&layer) {
            Ok(value) => layers.push(value),
            Err(err) => collector.emit(
                Diagnostic::warning(format!("cannot represent sitplan entry {index}: {err}"))
                    .with_code(ErrorCode::E202)
                    .with_subject(format!("sitplan.elements[{index}]")),
            ),
        }
    }

    debug!(entries = sitplan.elements.len(), layers = layers.len(), images = image_count; "Sitplan imported");
    if layers.is_empty() {
        return None;
    }

    Some(TreeSitplan {
        defaults: LayerDefaults {
            fontsize: Some(defaults.fontsize),
            scale: Some(defaults.scale),
            rotate: Some(defaults.rotate),
        },
        num_pages: (sitplan.num_pages != 1).then_some(sitplan.num_pages),
        active_page: (sitplan.active_page != 1).then_some(sitplan.active_page),
        layers,
        elements: Vec::new(),
    })
}

fn element_layer(
    entry: &SitplanEntry,
    id: u64,
    defaults: &SitplanDefaults,
    labels: &LabelMap,
) -> ElementLayer {
    let target = match labels.label_for(id) {
        Some(label) => LayerTarget::Ref(label.to_string()),
        None => LayerTarget::Id(id),
    };
    ElementLayer {
        pos: [round1(entry.posx), round1(entry.posy)],
        target,
        page: (entry.page != 1).then_some(entry.page),
        scale: (entry.scale != defaults.scale).then_some(entry.scale),
        rotate: (entry.rotate != defaults.rotate).then_some(entry.rotate),
        color: entry
            .color
            .as_deref()
            .filter(|color| !matches!(*color, DEFAULT_COLOR | "black"))
            .map(str::to_string),
        adreslocation: entry
            .adreslocation
            .as_deref()
            .filter(|location| *location != DEFAULT_ADDRESS_LOCATION)
            .map(str::to_string),
        labelfontsize: (entry.labelfontsize != defaults.fontsize).then_some(entry.labelfontsize),
    }
}

/// Writes the first embedded image of `entry` to `image_<n>.<ext>`.
fn extract_image(
    entry: &SitplanEntry,
    n: usize,
    assets: &mut dyn AssetStore,
    collector: &mut DiagnosticCollector,
) -> Option<ImageSource> {
    let Some((extension, payload)) = embedded_image(&entry.svg) else {
        trace!(svg_length = entry.svg.len(); "No embedded raster image in sitplan entry");
        return None;
    };
    let name = format!("image_{n}.{extension}");

    let written = STANDARD
        .decode(payload)
        .map_err(|err| err.to_string())
        .and_then(|bytes| assets.write(&name, &bytes).map_err(|err| err.to_string()));
    match written {
        Ok(()) => {
            debug!(name = name.as_str(); "Extracted sitplan image");
            Some(ImageSource::File(name))
        }
        Err(err) => {
            collector.emit(
                Diagnostic::warning(format!("cannot extract image `{name}`: {err}"))
                    .with_code(ErrorCode::E204)
                    .with_subject(name)
                    .with_help("the layer was kept without an image"),
            );
            None
        }
    }
}

/// Finds the first embedded PNG or JPEG payload and the file extension to
/// write it under.
fn embedded_image(svg: &str) -> Option<(&'static str, &str)> {
    let captures = EMBEDDED_IMAGE.captures(svg)?;
    let extension = match captures.get(1)?.as_str() {
        "png" => "png",
        _ => "jpg",
    };
    Some((extension, captures.get(2)?.as_str()))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn labels() -> LabelMap {
        let mut labels = LabelMap::new();
        labels.insert("A.1".to_string(), 2);
        labels.insert("A.2".to_string(), 3);
        labels
    }

    fn section(value: Value) -> TreeSitplan {
        serde_json::from_value(value).unwrap()
    }

    fn export(value: Value, assets: Option<&dyn AssetStore>) -> (Sitplan, Vec<Diagnostic>) {
        let mut collector = DiagnosticCollector::new();
        let sitplan = export_sitplan(Some(&section(value)), &labels(), assets, &mut collector);
        let (_, warnings) = collector.finish(()).unwrap().into_parts();
        (sitplan, warnings)
    }

    #[test]
    fn test_export_without_section() {
        let mut collector = DiagnosticCollector::new();
        let sitplan = export_sitplan(None, &labels(), None, &mut collector);

        assert_eq!(sitplan, Sitplan::default());
        assert_eq!(sitplan.defaults.fontsize, 11.0);
    }

    #[test]
    fn test_export_resolves_reference() {
        let (sitplan, warnings) = export(json!({"layers": [{"ref": "A.1", "pos": [10, 20]}]}), None);

        assert!(warnings.is_empty());
        assert_eq!(sitplan.defaults, SECTION_DEFAULTS);
        let entry = &sitplan.elements[0];
        assert_eq!(entry.electro_item_id, Some(2));
        assert_eq!((entry.posx, entry.posy), (10.0, 20.0));
        assert_eq!((entry.sizex, entry.sizey), (51.0, 50.0));
        assert!((entry.labelposx - 20.2).abs() < 1e-9);
        assert_eq!(entry.labelposy, 21.0);
        assert_eq!(entry.adrestype.as_deref(), Some("auto"));
        assert_eq!(entry.adreslocation.as_deref(), Some("rechts"));
        assert_eq!(entry.color.as_deref(), Some("#000000"));
        assert!(entry.movable);
    }

    #[test]
    fn test_export_drops_unresolved_reference() {
        let (sitplan, warnings) = export(
            json!({"layers": [{"ref": "Z.9", "pos": [1, 1]}, {"ref": "A.2"}, {"id": 40}]}),
            None,
        );

        let targets: Vec<_> = sitplan.elements.iter().map(|e| e.electro_item_id).collect();
        assert_eq!(targets, vec![Some(3), Some(40)]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E200));
        assert_eq!(warnings[0].subject(), Some("Z.9"));
    }

    #[test]
    fn test_export_layer_without_target() {
        let (sitplan, warnings) = export(json!({"layers": [{"pos": [1, 1]}]}), None);

        assert!(sitplan.elements.is_empty());
        assert_eq!(warnings[0].code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_export_malformed_number_uses_default() {
        let (sitplan, warnings) = export(
            json!({"defaults": {"scale": 0.5}, "layers": [{"ref": "A.1", "scale": "groot", "pos": ["3", 4]}]}),
            None,
        );

        let entry = &sitplan.elements[0];
        assert_eq!(entry.scale, 0.5);
        assert_eq!(entry.sizex, 101.0);
        assert_eq!(entry.posx, 3.0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E203));
        assert_eq!(warnings[0].subject(), Some("layers[0].scale"));
    }

    #[test]
    fn test_export_legacy_elements_key_and_pages() {
        let (sitplan, _) = export(
            json!({"numPages": 3, "activePage": 2, "elements": [{"ref": "A.1", "page": 2}]}),
            None,
        );

        assert_eq!(sitplan.num_pages, 3);
        assert_eq!(sitplan.active_page, 2);
        assert_eq!(sitplan.elements[0].page, 2);
    }

    #[test]
    fn test_export_image_layer() {
        let assets = MemoryAssets::new().with_file("plan.JPG", b"raw".to_vec());
        let (sitplan, warnings) = export(
            json!({"layers": [{"image": "plan.JPG", "pos": [0, 0], "size": [300, 100]}]}),
            Some(&assets),
        );

        assert!(warnings.is_empty());
        let entry = &sitplan.elements[0];
        assert!(entry.electro_item_id.is_none());
        assert_eq!(
            entry.svg,
            r#"<svg width="300" height="100"><image xlink:href="data:image/jpeg;base64,cmF3" width="300" height="100"/></svg>"#
        );
        assert!((entry.labelposx - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_missing_image_keeps_layer() {
        let assets = MemoryAssets::new();
        let (sitplan, warnings) = export(json!({"layers": [{"image": "weg.png"}]}), Some(&assets));

        assert_eq!(sitplan.elements.len(), 1);
        assert!(sitplan.elements[0].svg.is_empty());
        assert_eq!((sitplan.elements[0].sizex, sitplan.elements[0].sizey), (200.0, 200.0));
        assert_eq!(warnings[0].code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_export_image_without_store_is_silent() {
        let (sitplan, warnings) = export(json!({"layers": [{"image": "plan.png"}]}), None);

        assert!(sitplan.elements[0].svg.is_empty());
        assert!(warnings.is_empty());
    }

    fn packed(entries: Value) -> Sitplan {
        serde_json::from_value(json!({
            "numPages": 1,
            "activePage": 1,
            "defaults": {"fontsize": 10, "scale": 0.25, "rotate": 0},
            "elements": entries
        }))
        .unwrap()
    }

    fn import(sitplan: &Sitplan, assets: Option<&mut dyn AssetStore>) -> TreeSitplan {
        let mut collector = DiagnosticCollector::new();
        import_sitplan(Some(sitplan), &labels(), assets, &mut collector).unwrap()
    }

    #[test]
    fn test_import_element_layers() {
        let sitplan = packed(json!([
            {"posx": 10.04, "posy": 19.96, "scale": 0.25, "rotate": 0, "labelfontsize": 10,
             "color": "black", "adreslocation": "rechts", "electroItemId": 2},
            {"page": 2, "posx": 1, "posy": 2, "scale": 0.5, "rotate": 90, "labelfontsize": 10,
             "color": "#ff0000", "adreslocation": "links", "electroItemId": 77}
        ]));
        let tree = import(&sitplan, None);

        assert_eq!(tree.layers[0], json!({"pos": [10.0, 20.0], "ref": "A.1"}));
        assert_eq!(
            tree.layers[1],
            json!({"pos": [1.0, 2.0], "id": 77, "page": 2, "scale": 0.5, "rotate": 90.0,
                   "color": "#ff0000", "adreslocation": "links"})
        );
        assert_eq!(tree.defaults.scale, Some(0.25));
        assert!(tree.num_pages.is_none());
    }

    #[test]
    fn test_import_extracts_images() {
        let svg = r#"<svg><image xlink:href="data:image/gif;base64,R0lG"/><image xlink:href="data:image/jpeg;base64,cmF3"/></svg>"#;
        let sitplan = packed(json!([
            {"posx": 0, "posy": 0, "sizex": 300, "sizey": 100, "scale": 0.25, "svg": svg},
            {"posx": 5, "posy": 5, "sizex": 10, "sizey": 10, "scale": 0.25, "svg": "<svg/>"}
        ]));
        let mut assets = MemoryAssets::new();
        let tree = import(&sitplan, Some(&mut assets));

        assert_eq!(
            tree.layers[0],
            json!({"pos": [0.0, 0.0], "size": [300.0, 100.0], "image": "image_0.jpg"})
        );
        assert_eq!(tree.layers[1], json!({"pos": [5.0, 5.0], "size": [10.0, 10.0]}));
        assert_eq!(assets.get("image_0.jpg"), Some(&b"raw"[..]));
        assert_eq!(assets.names().count(), 1);
    }

    #[test]
    fn test_import_without_store_reports_length() {
        let sitplan = packed(json!([{"posx": 0, "posy": 0, "scale": 0.25, "svg": "<svg>abc</svg>"}]));
        let tree = import(&sitplan, None);

        assert_eq!(tree.layers[0]["svg_length"], json!(14));
    }

    #[test]
    fn test_import_empty_sitplan_is_none() {
        let mut collector = DiagnosticCollector::new();
        let sitplan = packed(json!([]));

        assert!(import_sitplan(Some(&sitplan), &labels(), None, &mut collector).is_none());
        assert!(import_sitplan(None, &labels(), None, &mut collector).is_none());
    }

    #[test]
    fn test_embedded_image_skips_unsupported_formats() {
        assert_eq!(
            embedded_image("data:image/gif;base64,AAAA data:image/png;base64,QUJD\"/>"),
            Some(("png", "QUJD"))
        );
        assert_eq!(embedded_image("data:image/png;base64,\"/>"), None);
        assert_eq!(embedded_image("<svg/>"), None);
    }

    #[test]
    fn test_embedded_image_in_editor_svg() {
        let svg = r#"<svg width="50" height="40"><image href="data:image/jpeg;base64,/9j/4A+=" x="0"/></svg>"#;
        assert_eq!(embedded_image(svg), Some(("jpg", "/9j/4A+=")));

        let svg = r#"<image href='data:image/jpg;base64,QUJD'/>"#;
        assert_eq!(embedded_image(svg), Some(("jpg", "QUJD")));
    }
}
