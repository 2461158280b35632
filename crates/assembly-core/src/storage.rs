//! Material packages and the bounded FIFO storages machines hold them in.

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One unit of a named material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPackage {
    pub material: String,
    /// Cell the package was last placed at. Presentation only.
    pub last_position: Position,
}

impl MaterialPackage {
    pub fn new(material: impl Into<String>, last_position: Position) -> Self {
        Self {
            material: material.into(),
            last_position,
        }
    }
}

/// An ordered, bounded sequence of packages. Oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    packages: VecDeque<MaterialPackage>,
    capacity: u32,
}

impl Storage {
    pub fn new(capacity: u32) -> Self {
        Self {
            packages: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check if the storage has room for `count` more packages.
    pub fn has_space_for(&self, count: u32) -> bool {
        self.packages.len() as u64 + count as u64 <= self.capacity as u64
    }

    pub fn is_full(&self) -> bool {
        !self.has_space_for(1)
    }

    /// Append a package at the back. A full storage hands the package back.
    #[must_use = "a rejected package must be returned to where it came from"]
    pub fn push(&mut self, package: MaterialPackage) -> Result<(), MaterialPackage> {
        if self.is_full() {
            return Err(package);
        }
        self.packages.push_back(package);
        Ok(())
    }

    /// Put a package back at the front, where it keeps its age.
    #[must_use = "a rejected package must be returned to where it came from"]
    pub fn push_front(&mut self, package: MaterialPackage) -> Result<(), MaterialPackage> {
        if self.is_full() {
            return Err(package);
        }
        self.packages.push_front(package);
        Ok(())
    }

    /// Remove and return the oldest package.
    pub fn pop_oldest(&mut self) -> Option<MaterialPackage> {
        self.packages.pop_front()
    }

    /// Remove and return the oldest package that satisfies `pred`.
    pub fn take_oldest_where<F>(&mut self, pred: F) -> Option<MaterialPackage>
    where
        F: FnMut(&MaterialPackage) -> bool,
    {
        let index = self.packages.iter().position(pred)?;
        self.packages.remove(index)
    }

    /// Remove up to `count` packages of `material`, oldest first. Returns how
    /// many were removed.
    pub fn remove_material(&mut self, material: &str, count: u32) -> u32 {
        let mut removed = 0;
        while removed < count {
            if self.take_oldest_where(|p| p.material == material).is_none() {
                break;
            }
            removed += 1;
        }
        removed
    }

    /// Number of packages of a given material.
    pub fn count(&self, material: &str) -> u32 {
        self.packages
            .iter()
            .filter(|p| p.material == material)
            .count() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialPackage> {
        self.packages.iter()
    }
}
