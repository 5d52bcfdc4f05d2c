#![no_main]

use std::path::Path;

use bed3d::assets::{AssetLoader, AssetStatus, AssetTicket, LoadedTexture, TextureRequest};
use bed3d::geometry::Point2d;
use bed3d::render::RenderGeometry;
use bed3d::{Bed3D, BedConfig, BedShape};
use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;

#[derive(Debug)]
struct FuzzBed {
    points: Vec<(f64, f64)>,
    height: f64,
    force_custom: bool,
    query: (f64, f64),
}

impl<'a> Arbitrary<'a> for FuzzBed {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let point_count = u.int_in_range(0..=64)?;
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            points.push((u.arbitrary()?, u.arbitrary()?));
        }

        Ok(FuzzBed {
            points,
            height: u.arbitrary()?,
            force_custom: u.arbitrary()?,
            query: (u.arbitrary()?, u.arbitrary()?),
        })
    }
}

struct IdleLoader;

impl AssetLoader for IdleLoader {
    fn request_texture(&mut self, _: &Path, _: TextureRequest) -> AssetTicket {
        AssetTicket(0)
    }

    fn poll_texture(&mut self, _: AssetTicket) -> AssetStatus<LoadedTexture> {
        AssetStatus::Pending
    }

    fn request_model(&mut self, _: &Path) -> AssetTicket {
        AssetTicket(0)
    }

    fn poll_model(&mut self, _: AssetTicket) -> AssetStatus<RenderGeometry> {
        AssetStatus::Pending
    }

    fn release(&mut self, _: AssetTicket) {}
}

fuzz_target!(|data: FuzzBed| {
    let mut bed = Bed3D::new(BedConfig::new(), Box::new(IdleLoader));
    let shape = BedShape::from_xy(&data.points);
    bed.set_shape(&shape, data.height, "", "", data.force_custom);
    bed.set_shape(&shape, data.height, "", "", data.force_custom);

    let query = Point2d::new(data.query.0, data.query.1);
    let _ = bed.contains(&query);
    let _ = bed.point_projection(&query);
});
