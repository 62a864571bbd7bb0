// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod csv;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod ids;
pub mod model;
pub mod session;
pub mod table;
pub mod validation;
pub mod view;

pub use error::*;
pub use forms::*;
pub use gateway::*;
pub use ids::*;
pub use model::*;
pub use session::*;
pub use table::*;
pub use validation::FieldError;
pub use view::*;
