pub mod cart;
pub mod cheats;
pub mod chip;
pub mod config;
pub mod db;
pub mod emu;
pub mod error;
pub mod input;
pub mod io;
pub mod memory;
pub mod ranges;
pub mod reset;
pub mod rom;
pub mod state;
pub mod timer;

pub use cart::board::Board;
pub use config::Config;
pub use emu::{CpuHost, Emu, IrqSource, PpuHost, Snapshot};
pub use error::Error;
pub use reset::ResetKind;

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::TRACE)
            .pretty()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
