pub mod reader;
pub mod writer;

pub use reader::{read_pack, PackReader};
pub use writer::{encode_pack, write_pack, PackWriter, FORMAT_VERSION};
