pub mod claude;
pub mod error;
pub mod openai;
pub mod params;
pub mod traits;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use openai::OpenAi;
pub use params::CompletionParams;
pub use traits::EmbedAgent;
pub use util::{strip_code_blocks, strip_list_label, truncate_to_char_boundary};
