//! Column partition between the available and chosen containers
//!
//! Every header of the loaded file lives in exactly one container. All moves
//! remove the item from its current container before inserting it elsewhere,
//! so no sequence of operations can duplicate or lose a column.

use crate::core::models::{AppError, AppResult, ColumnSide};

/// An ordered container of column items.
///
/// Items are identified by their header name. When names repeat, lookups
/// resolve to the first match.
pub trait ColumnContainer {
    fn side(&self) -> ColumnSide;

    /// Item names in visual order
    fn items(&self) -> &[String];

    fn clear(&mut self);

    fn insert(&mut self, index: usize, name: String);

    fn remove_at(&mut self, index: usize) -> String;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items().iter().position(|item| item == name)
    }

    fn append(&mut self, name: String) {
        let end = self.len();
        self.insert(end, name);
    }
}

/// In-memory container backed by a `Vec`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList {
    side: ColumnSide,
    items: Vec<String>,
}

impl ColumnList {
    pub fn new(side: ColumnSide) -> Self {
        Self {
            side,
            items: Vec::new(),
        }
    }
}

impl ColumnContainer for ColumnList {
    fn side(&self) -> ColumnSide {
        self.side
    }

    fn items(&self) -> &[String] {
        &self.items
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn insert(&mut self, index: usize, name: String) {
        let index = index.min(self.items.len());
        self.items.insert(index, name);
    }

    fn remove_at(&mut self, index: usize) -> String {
        self.items.remove(index)
    }
}

/// The pair of containers a picker renders
#[derive(Debug, Clone)]
pub struct ColumnBoard<C: ColumnContainer = ColumnList> {
    available: C,
    chosen: C,
}

impl Default for ColumnBoard<ColumnList> {
    fn default() -> Self {
        Self::new(
            ColumnList::new(ColumnSide::Available),
            ColumnList::new(ColumnSide::Chosen),
        )
    }
}

impl<C: ColumnContainer> ColumnBoard<C> {
    pub fn new(available: C, chosen: C) -> Self {
        Self { available, chosen }
    }

    pub fn available(&self) -> &[String] {
        self.available.items()
    }

    pub fn chosen(&self) -> &[String] {
        self.chosen.items()
    }

    pub fn len(&self) -> usize {
        self.available.len() + self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all items and put `headers` into the available container in order
    pub fn populate<I>(&mut self, headers: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.available.clear();
        self.chosen.clear();
        for header in headers {
            self.available.append(header);
        }
    }

    pub fn clear(&mut self) {
        self.available.clear();
        self.chosen.clear();
    }

    /// Find a column, searching the available container first
    pub fn locate(&self, name: &str) -> Option<(ColumnSide, usize)> {
        if let Some(index) = self.available.position(name) {
            return Some((ColumnSide::Available, index));
        }
        self.chosen
            .position(name)
            .map(|index| (ColumnSide::Chosen, index))
    }

    /// Move a column to the end of the other container; returns its new side
    pub fn toggle(&mut self, name: &str) -> AppResult<ColumnSide> {
        let (side, index) = self.require(name)?;
        let item = self.container_mut(side).remove_at(index);
        let target = side.other();
        self.container_mut(target).append(item);
        Ok(target)
    }

    /// Insert `dragged` right before `target`, in whichever container holds `target`
    pub fn drop_on_item(&mut self, dragged: &str, target: &str) -> AppResult<ColumnSide> {
        let (dragged_side, dragged_index) = self.require(dragged)?;
        let (target_side, _) = self.require(target)?;
        if dragged == target {
            return Ok(dragged_side);
        }

        let item = self.container_mut(dragged_side).remove_at(dragged_index);
        // positions shift once the dragged item is out
        let target_index = self
            .container(target_side)
            .position(target)
            .ok_or_else(|| AppError::UnknownColumn(target.to_string()))?;
        self.container_mut(target_side).insert(target_index, item);
        Ok(target_side)
    }

    /// Append `dragged` to the chosen container
    pub fn drop_on_chosen(&mut self, dragged: &str) -> AppResult<()> {
        let (side, index) = self.require(dragged)?;
        let item = self.container_mut(side).remove_at(index);
        self.chosen.append(item);
        Ok(())
    }

    fn require(&self, name: &str) -> AppResult<(ColumnSide, usize)> {
        self.locate(name)
            .ok_or_else(|| AppError::UnknownColumn(name.to_string()))
    }

    fn container(&self, side: ColumnSide) -> &C {
        match side {
            ColumnSide::Available => &self.available,
            ColumnSide::Chosen => &self.chosen,
        }
    }

    fn container_mut(&mut self, side: ColumnSide) -> &mut C {
        match side {
            ColumnSide::Available => &mut self.available,
            ColumnSide::Chosen => &mut self.chosen,
        }
    }
}
