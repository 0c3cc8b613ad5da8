pub mod conf_cmd;
pub mod langs_cmd;
pub mod rehearse_cmd;
pub mod url_cmd;
