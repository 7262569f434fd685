// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod filter;
pub mod ids;
pub mod model;
pub mod page;
pub mod state;

pub use controller::*;
pub use filter::*;
pub use ids::*;
pub use model::*;
pub use page::*;
pub use state::*;
