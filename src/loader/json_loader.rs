// src/loader/json_loader.rs
use crate::error::MapError;
use crate::gid::GID_MASK;
use crate::ir_map::*;
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonMap {
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    tilesets: Vec<JsonTileset>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

/// Either an embedded tileset or a `{firstgid, source}` reference to an
/// external one.
#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    firstgid: Option<u32>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    transparentcolor: Option<String>,
    #[serde(default)]
    tileoffset: Option<JsonTileOffset>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonTileOffset {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

fn json_property_to_ir(prop: JsonProperty) -> Result<Option<(String, PropertyValue)>, MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => {
            value.as_str().map(|s| PropertyValue::String(s.to_owned()))
        }
        Some(other) => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    Ok(parsed.map(|value| (name, value)))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        if let Some((name, value)) = json_property_to_ir(p)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn tileset_to_ir(ts: JsonTileset, first_gid: u32) -> Result<IrTileset, MapError> {
    if ts.tilewidth == 0 || ts.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "Tileset '{}' has a zero tile size",
            ts.name
        )));
    }

    let tiles = ts
        .tiles
        .into_iter()
        .map(|tile| -> Result<IrTileMetadata, MapError> {
            // `class` replaced `type` in Tiled 1.9; an empty label means none
            let kind = tile.class.or(tile.kind).filter(|k| !k.is_empty());
            Ok(IrTileMetadata {
                id: tile.id,
                kind,
                properties: properties_from_json(tile.properties)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IrTileset {
        first_gid,
        name: ts.name,
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        spacing: ts.spacing,
        margin: ts.margin,
        image: ts.image.map(|source| IrImage {
            source,
            transparent_color: ts.transparentcolor,
        }),
        tile_offset: ts.tileoffset.map(|o| (o.x, o.y)),
        properties: properties_from_json(ts.properties)?,
        tiles,
    })
}

/// Decodes a standalone tileset document whose range starts at `first_gid`.
pub fn decode_tileset_str(json: &str, first_gid: u32) -> Result<IrTileset, MapError> {
    let ts: JsonTileset = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: PathBuf::from("<memory>"),
        source,
    })?;
    tileset_to_ir(ts, first_gid)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes a Tiled JSON map, inlining external tilesets. Returns the map
/// directory alongside, which image paths are relative to.
pub fn decode_map_file_to_ir(path: &str) -> Result<(IrMap, PathBuf), MapError> {
    let p = Path::new(path);
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {path}"
        )));
    }

    let j: JsonMap = read_json(p)?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    // Build IR tilesets, keeping declaration order
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for mut ts in j.tilesets {
        let first_gid = ts.firstgid.ok_or_else(|| {
            MapError::InvalidMap(format!("Tileset '{}' has no firstgid", ts.name))
        })?;
        if first_gid > GID_MASK {
            return Err(MapError::InvalidMap(format!(
                "Tileset '{}' firstgid {} overlaps the flip bits",
                ts.name, first_gid
            )));
        }

        // External tilesets reference their image relative to their own file
        let (ts, tileset_dir) = match ts.source.take() {
            Some(source) => {
                if !source.ends_with(".json") {
                    return Err(MapError::InvalidMap(format!(
                        "External tileset must be JSON: {}",
                        source
                    )));
                }
                let external = read_json::<JsonTileset>(&map_dir.join(&source))?;
                (external, Path::new(&source).parent().map(Path::to_path_buf))
            }
            None => (ts, None),
        };

        let mut ir = tileset_to_ir(ts, first_gid)?;
        if let (Some(dir), Some(image)) = (tileset_dir, ir.image.as_mut()) {
            image.source = dir.join(&image.source).to_string_lossy().into_owned();
        }
        ir_tilesets.push(ir);
    }

    // Build IR layers; only tile layers carry gids
    let mut ir_layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {}
            other => {
                log::debug!("skipping {} layer '{}'", other, l.name);
                continue;
            }
        }
        if l.data.len() != l.width * l.height {
            return Err(MapError::InvalidMap(format!(
                "Layer '{}' has {} cells, expected {}x{}",
                l.name,
                l.data.len(),
                l.width,
                l.height
            )));
        }
        ir_layers.push(IrLayer {
            name: l.name,
            visible: l.visible,
            opacity: l.opacity,
            offset: vec2(l.offsetx, l.offsety),
            properties: properties_from_json(l.properties)?,
            width: l.width,
            height: l.height,
            data: l.data,
        });
    }

    Ok((
        IrMap {
            tile_w: j.tilewidth,
            tile_h: j.tileheight,
            properties: properties_from_json(j.properties)?,
            tilesets: ir_tilesets,
            layers: ir_layers,
        },
        map_dir,
    ))
}
