pub(crate) mod bitmap;
pub(crate) mod export;
pub(crate) mod raster;
pub(crate) mod thumbnails;
