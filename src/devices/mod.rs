
// Currently the only supported device is the Siglent SDS1000X-E series.  Other Siglent scopes speak mostly the
// same command set, so they would go next to it as siblings
pub mod sds1000x;
