//! Live scene state and its mutators.
//!
//! # Responsibility
//! - Hold the single editable scene: board offset plus ordered piece list.
//! - Provide the add/remove/reorder/edit operations the presentation layer
//!   calls into.
//!
//! # Invariants
//! - `pieces` order is paint order; reorder operations are atomic swaps of
//!   the list, never a clear-then-repopulate.
//! - Mutators do not schedule persistence themselves; the caller marks the
//!   project store dirty after mutating.

use crate::model::piece::{Piece, PieceId, ShapeKind};
use serde::{Deserialize, Serialize};

/// A 2D position in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Cursor-position provider supplied by the presentation layer.
///
/// The core consumes this seam when spawning pieces at the pointer; it never
/// implements pointer tracking itself.
pub trait PointerInput {
    /// Current pointer position in screen coordinates.
    fn cursor_position(&self) -> Point;
}

/// The editable scene: board offset plus z-ordered pieces.
///
/// Serializes to the external scene schema
/// (`{ boardX, boardY, pieces: [...] }`); missing fields deserialize to the
/// empty default so legacy `{}` blobs load as an empty board.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(rename = "boardX")]
    pub board_x: f64,
    #[serde(rename = "boardY")]
    pub board_y: f64,
    pub pieces: Vec<Piece>,
}

impl Scene {
    /// Converts a screen-space pointer position into board coordinates by
    /// removing the board scroll offset.
    pub fn cursor_to_board(&self, cursor: Point) -> Point {
        Point {
            x: cursor.x - self.board_x,
            y: cursor.y - self.board_y,
        }
    }

    /// Spawns a new piece of `kind` at a board position with its default
    /// color, on top of the paint order.
    pub fn spawn_piece(&mut self, kind: ShapeKind, at: Point) -> PieceId {
        let piece = Piece::new(kind, at.x, at.y);
        let id = piece.id;
        self.pieces.push(piece);
        id
    }

    /// Spawns a new piece under the current cursor position.
    pub fn spawn_piece_at_cursor(&mut self, kind: ShapeKind, pointer: &dyn PointerInput) -> PieceId {
        let at = self.cursor_to_board(pointer.cursor_position());
        self.spawn_piece(kind, at)
    }

    /// Removes a piece by id. Returns whether the piece existed.
    pub fn remove_piece(&mut self, id: PieceId) -> bool {
        let before = self.pieces.len();
        self.pieces.retain(|piece| piece.id != id);
        self.pieces.len() != before
    }

    /// Mutable access to one piece for field edits.
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|piece| piece.id == id)
    }

    fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|piece| piece.id == id)
    }

    /// Moves a piece one step back in the paint order.
    pub fn move_piece_back(&mut self, id: PieceId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.pieces.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Moves a piece one step forward in the paint order.
    pub fn move_piece_forward(&mut self, id: PieceId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.pieces.len() => {
                self.pieces.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Sends a piece to the very back of the paint order.
    pub fn send_piece_to_back(&mut self, id: PieceId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let piece = self.pieces.remove(index);
                self.pieces.insert(0, piece);
                true
            }
            None => false,
        }
    }

    /// Sends a piece to the very front of the paint order.
    pub fn send_piece_to_front(&mut self, id: PieceId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let piece = self.pieces.remove(index);
                self.pieces.push(piece);
                true
            }
            None => false,
        }
    }
}
