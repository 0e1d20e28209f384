use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdflip_genesis::{
    draw_image, draw_image_flipped_h, ImageAsset, Plane, TileMap, TileSet, Vdp,
};

/// Full-screen 40x28 image with one unique tile per cell
fn screen_image() -> ImageAsset {
    let cells = 40 * 28;
    let tiles: Vec<u32> = (0..cells * 8).map(|i| (i as u32).wrapping_mul(0x0101_0101)).collect();
    let tilemap: Vec<u16> = (0..cells as u16).collect();
    ImageAsset::new(
        TileSet::new(tiles).expect("whole tiles"),
        TileMap::new(40, 28, tilemap).expect("matching dimensions"),
    )
}

fn bench_blit(c: &mut Criterion) {
    let image = screen_image();
    let mut vdp = Vdp::new();

    c.bench_function("draw_image_flipped_h 40x28", |b| {
        b.iter(|| {
            draw_image_flipped_h(
                &mut vdp,
                Plane::A,
                black_box(Some(&image)),
                black_box(16),
                0,
                0,
                0,
                false,
            )
        })
    });

    c.bench_function("draw_image 40x28", |b| {
        b.iter(|| draw_image(&mut vdp, Plane::A, black_box(Some(&image)), black_box(16), 0, 0, 0, false))
    });
}

criterion_group!(benches, bench_blit);
criterion_main!(benches);
