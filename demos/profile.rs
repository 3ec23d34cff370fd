const RANGE: f32 = 65536.0;
const COUNT: usize = 65536 * 16;

use boxtree::prelude::*;
use rand::Rng;

fn random_boxes() -> Vec<(usize, Aabb<f32>)> {
    let mut boxes = Vec::with_capacity(COUNT);
    let mut rnd = rand::thread_rng();

    for i in 0..COUNT {
        let x = rnd.gen_range(0.0..=RANGE);
        let y = rnd.gen_range(0.0..=RANGE);
        let z = rnd.gen_range(0.0..=RANGE);
        let radius = rnd.gen_range(1.0..=64.0);

        boxes.push((i, Aabb::from_sphere(TVec3::new(x, y, z), radius)));
    }

    boxes
}

fn main() {
    let mut tree: AabbTree<usize, f32, 8> = AabbTree::with_capacity(COUNT / 4);

    tree.extend(random_boxes());
    tree.optimize();

    let query = Aabb::from_sphere(TVec3::splat(RANGE / 2.0), 1024.0);
    let _ = tree.query(&query);
}
