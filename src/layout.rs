use crate::settings::LayoutSettings;
use eframe::egui::{Pos2, Vec2};

/// Grid cell counted from the bottom-left of the widget block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub col: usize,
    pub row_from_bottom: usize,
}

impl Cell {
    pub fn new(col: usize, row_from_bottom: usize) -> Self {
        Self {
            col,
            row_from_bottom,
        }
    }
}

/// Screen position and size of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Pos2,
    pub size: Vec2,
}

impl LayoutSettings {
    pub fn widget_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn control_size(&self) -> Vec2 {
        Vec2::new(self.width, self.control_height)
    }

    /// Top-left corner of `cell`.
    pub fn cell_position(&self, cell: Cell) -> Pos2 {
        let x = self.margin_x + cell.col as f32 * (self.width + self.gap);
        let y = self.screen_height
            - self.margin_y
            - (cell.row_from_bottom as f32 + 1.0) * (self.height + self.gap);
        Pos2::new(x, y)
    }

    pub fn place(&self, cell: Cell) -> Placement {
        Placement {
            position: self.cell_position(cell),
            size: self.widget_size(),
        }
    }

    /// The settings bar sits one gap above the widget at `below`.
    pub fn place_control_above(&self, below: Cell) -> Placement {
        let anchor = self.cell_position(below);
        Placement {
            position: Pos2::new(anchor.x, anchor.y - self.gap - self.control_height),
            size: self.control_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_row_sits_above_margin() {
        let layout = LayoutSettings::default();
        assert_eq!(layout.cell_position(Cell::new(0, 0)), Pos2::new(80.0, 900.0));
        assert_eq!(layout.cell_position(Cell::new(1, 3)), Pos2::new(250.0, 600.0));
    }

    #[test]
    fn control_bar_above_anchor() {
        let layout = LayoutSettings::default();
        let p = layout.place_control_above(Cell::new(0, 3));
        assert_eq!(p.position, Pos2::new(80.0, 558.0));
        assert_eq!(p.size, Vec2::new(160.0, 32.0));
    }
}
