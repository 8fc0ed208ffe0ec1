//! Turntable viewer core: a ring of N photos shown as one rotatable object.
//!
//! Pointer drags feed [`viewer::ViewerState`], which maps the accumulated
//! angle onto an image index and a small offset angle. The
//! [`compositor::ViewCompositor`] turns that pair into a displayed surface and
//! an observer position through the [`compositor::Scene`] trait.

pub mod accumulator;
pub mod assets;
pub mod compositor;
pub mod config;
pub mod fonts;
pub mod i18n;
pub mod input;
pub mod mapper;
pub mod mesh;
pub mod viewer;
