//! Assembly Core -- tile-scanned factory simulation.
//!
//! A rectangular tile area is scanned, classified into machines (drills,
//! refineries, smelters, armories, conveyors and a terminal rocket) and
//! wired into a directed graph of ports. The graph is then advanced on a
//! fixed tick, moving material packages from producers through conveyors
//! into consumers. Rebuilding after the layout changes keeps the state of
//! every machine that did not change.
//!
//! # Rebuild Pipeline
//!
//! 1. [`snapshot::GridSnapshot::capture`] -- read the tile grid once.
//! 2. [`topology::TopologyBuilder::build`] -- classify, wire conveyors,
//!    specialize drills by terrain.
//! 3. [`migration::migrate`] -- move storages over from the previous graph.
//!
//! # Tick
//!
//! [`engine::ProductionEngine::tick`] runs a process pass then a transport
//! pass over the live graph and returns the [`event::ProductionEvent`]s of
//! the tick. [`simulation::Simulation`] ties rebuilds, ticks, the
//! [`clock::SimulationClock`] and a [`simulation::Presenter`] together.
//!
//! # Key Types
//!
//! - [`catalog::MachineCatalog`] -- immutable machine templates keyed by
//!   tile key, built with [`catalog::CatalogBuilder`].
//! - [`graph::MachineGraph`] -- machines of one generation with O(1)
//!   lookup by position.
//! - [`orientation::CONVEYOR_ORIENTATIONS`] -- the twelve conveyor tiles.
//! - [`storage::Storage`] -- bounded FIFO of [`storage::MaterialPackage`]s.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod graph;
pub mod id;
pub mod migration;
pub mod orientation;
pub mod overlay;
pub mod position;
pub mod simulation;
pub mod snapshot;
pub mod storage;
pub mod topology;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
