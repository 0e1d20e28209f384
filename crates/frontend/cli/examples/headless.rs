use mdflip_genesis::{
    draw_image_flipped_h, ImageAsset, Plane, TileMap, TileSet, Vdp,
};

// Mirrors a 4x2 image and prints the tile indices left on plane A
fn main() {
    let tiles = TileSet::new(vec![0x1111_1111; 4 * 8]).expect("whole tiles");
    let tilemap = TileMap::new(4, 2, vec![0, 1, 2, 3, 0, 1, 2, 3]).expect("4x2 tilemap");
    let image = ImageAsset::new(tiles, tilemap);

    let mut vdp = Vdp::new();
    let outcome = draw_image_flipped_h(&mut vdp, Plane::A, Some(&image), 100, 2, 1, 0, false);
    println!("{:?}", outcome);

    for y in 0..4 {
        let row: Vec<String> = (0..8)
            .map(|x| {
                let attr = vdp.tile_attr(Plane::A, x, y);
                if attr.bits() == 0 {
                    "  . ".to_string()
                } else {
                    format!("{:3}{}", attr.tile_index(), if attr.hflip() { "<" } else { " " })
                }
            })
            .collect();
        println!("{}", row.join(""));
    }
}
