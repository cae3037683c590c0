use std::collections::HashMap;
use std::env;
use std::fmt::{Debug, Display};
use std::result;

use lazy_static::lazy_static;

pub type Res<T> = Result<T, String>;

pub trait ErrToStr<T, E: Display> {
    fn err_to_str(self) -> Res<T>;
}

impl<T, E: Display> ErrToStr<T, E> for result::Result<T, E> {
    fn err_to_str(self) -> Res<T> {
        self.map_err(|err| err.to_string())
    }
}

#[derive(strum_macros::Display, Eq, PartialEq, Debug, Hash, Clone, Copy)]
pub enum DbgFlg {
    #[strum(serialize = "DBG_FLG_BUILD")]
    Build,
    #[strum(serialize = "DBG_FLG_LANDS")]
    Lands,
    #[strum(serialize = "DBG_FLG_LOADER")]
    Loader,
    #[strum(serialize = "DBG_FLG_WARN")]
    Warn,
}

lazy_static! {
    pub static ref DBG_FLG_DEFAULTS: HashMap<DbgFlg, bool> = HashMap::from([
        (DbgFlg::Build, false),
        (DbgFlg::Lands, false),
        (DbgFlg::Loader, false),
        (DbgFlg::Warn, true),
    ]);
}

pub trait DebugIf: Debug {
    fn dbg_if(&self, flg: DbgFlg);
}

impl<T: Debug> DebugIf for T {
    fn dbg_if(&self, flg: DbgFlg)
    where
        Self: Debug,
    {
        if checkflag(&flg) {
            dbg!(self);
        }
    }
}

pub fn log_if(s: &str, flg: DbgFlg) {
    if checkflag(&flg) {
        eprintln!("{} {}", utc_now(), s);
    }
}

pub fn warn(s: &str) {
    log_if(&format!("warning: {}", s), DbgFlg::Warn);
}

fn utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn checkflag(flg: &DbgFlg) -> bool {
    env::var(flg.to_string()).ok().map_or_else(
        || DBG_FLG_DEFAULTS.get(flg).copied().unwrap_or(false),
        |s| s == "1" || s == "true",
    )
}
