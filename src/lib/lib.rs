pub mod conjugate;
pub mod grid;
pub mod integrate;
pub mod io;
pub mod monte_carlo;
pub mod plot;
pub mod posterior;
pub mod simulation;
