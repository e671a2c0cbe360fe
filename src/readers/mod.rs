pub mod coadd_reader;
pub mod url_list;

pub use coadd_reader::CoaddReader;
pub use url_list::UrlListReader;
