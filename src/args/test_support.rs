use clap::Parser;

use super::LoadforgeArgs;

pub(super) fn parse_test_args<I, T>(args: I) -> Result<LoadforgeArgs, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    LoadforgeArgs::try_parse_from(args).map_err(|err| err.to_string())
}
