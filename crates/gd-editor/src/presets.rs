//! Built-in palette and predefined shapes.

use gd_core::{NodeIndex, Scene, SceneError, SceneNode};

/// Palette symbols and the grid cells they are shown at.
pub const PALETTE: [(f64, f64, &str); 6] = [
    (2.0, 0.0, "&"),
    (4.0, 0.0, "#"),
    (6.0, 0.0, "@"),
    (2.0, 1.0, "%"),
    (4.0, 1.0, "X"),
    (6.0, 1.0, "0"),
];

/// Symbol every predefined shape is drawn with.
pub const SHAPE_SYMBOL: &str = "X";

/// A named group template: anchor at the shape centre, one element per cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePreset {
    pub name: &'static str,
    pub anchor: (f64, f64),
    pub cells: &'static [(f64, f64)],
}

pub const SQUARE: ShapePreset = ShapePreset {
    name: "square",
    anchor: (52.0, 12.0),
    cells: &[
        (50.0, 10.0),
        (51.0, 10.0),
        (52.0, 10.0),
        (53.0, 10.0),
        (54.0, 10.0),
        (50.0, 11.0),
        (54.0, 11.0),
        (50.0, 12.0),
        (54.0, 12.0),
        (50.0, 13.0),
        (54.0, 13.0),
        (50.0, 14.0),
        (51.0, 14.0),
        (52.0, 14.0),
        (53.0, 14.0),
        (54.0, 14.0),
    ],
};

pub const Z_SHAPE: ShapePreset = ShapePreset {
    name: "z",
    anchor: (104.0, 12.0),
    cells: &[
        (100.0, 10.0),
        (101.0, 10.0),
        (102.0, 10.0),
        (103.0, 10.0),
        (104.0, 10.0),
        (100.0, 11.0),
        (101.0, 11.0),
        (102.0, 11.0),
        (103.0, 11.0),
        (104.0, 11.0),
        (104.0, 13.0),
        (105.0, 13.0),
        (106.0, 13.0),
        (107.0, 13.0),
        (108.0, 13.0),
        (104.0, 14.0),
        (105.0, 14.0),
        (106.0, 14.0),
        (107.0, 14.0),
        (108.0, 14.0),
    ],
};

pub const SMILEY: ShapePreset = ShapePreset {
    name: "smiley",
    anchor: (75.0, 12.0),
    cells: &[
        // eyes
        (71.0, 9.0),
        (72.0, 9.0),
        (78.0, 9.0),
        (79.0, 9.0),
        (71.0, 10.0),
        (72.0, 10.0),
        (78.0, 10.0),
        (79.0, 10.0),
        // mouth
        (67.0, 12.0),
        (68.0, 12.0),
        (82.0, 12.0),
        (68.0, 13.0),
        (69.0, 13.0),
        (81.0, 13.0),
        (70.0, 14.0),
        (71.0, 14.0),
        (72.0, 14.0),
        (73.0, 14.0),
        (74.0, 14.0),
        (75.0, 14.0),
        (76.0, 14.0),
        (77.0, 14.0),
        (78.0, 14.0),
        (79.0, 14.0),
        (80.0, 14.0),
    ],
};

pub const SHAPES: [ShapePreset; 3] = [SQUARE, Z_SHAPE, SMILEY];

/// Add one element per palette entry to `palette`.
pub fn fill_palette(scene: &mut Scene, palette: NodeIndex) -> Result<(), SceneError> {
    for (x, y, symbol) in PALETTE {
        let el = scene.insert(SceneNode::element(x, y).with_symbol(symbol));
        scene.add(palette, el)?;
    }
    Ok(())
}

/// Create a detached template group for `preset`.
pub fn build_shape(scene: &mut Scene, preset: &ShapePreset) -> Result<NodeIndex, SceneError> {
    let (ax, ay) = preset.anchor;
    let group = scene.insert(SceneNode::group().at(ax, ay));
    for &(x, y) in preset.cells {
        let el = scene.insert(SceneNode::element(x, y).with_symbol(SHAPE_SYMBOL));
        scene.add(group, el)?;
    }
    log::debug!("shape {:?}: {} cells", preset.name, preset.cells.len());
    Ok(group)
}
