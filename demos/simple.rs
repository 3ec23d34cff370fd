use boxtree::prelude::*;

fn main() -> Result<(), TreeError> {
    let mut tree: AabbTree<&str> = AabbTree::with_capacity(8);

    tree.add("origin", Aabb::new(TVec3::splat(-1.0), TVec3::splat(1.0))?);
    tree.add("x", Aabb::from_sphere(TVec3::new(10.0, 0.0, 0.0), 1.0));
    tree.add("y", Aabb::from_sphere(TVec3::new(0.0, 10.0, 0.0), 1.0));
    tree.add("z", Aabb::from_sphere(TVec3::new(0.0, 0.0, 10.0), 1.0));
    tree.optimize();

    // Searching along a segment
    let ray = Ray::new(TVec3::zero(), TVec3::new(1.0, 0.0, 0.0), 12.0);
    let mut hits = tree.query(&ray);
    hits.sort();
    assert_eq!(hits, vec!["origin", "x"]);

    // Searching with a view frustum
    let identity = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];
    let frustum = Frustum::from_matrices(&identity, &identity)?;
    assert_eq!(tree.query(&frustum), vec!["origin"]);

    assert_eq!(tree.remove(&"origin"), 1);
    assert!(tree.query(&frustum).is_empty());

    let mut out = String::new();
    if tree.debug_print(true, &mut out).is_ok() {
        print!("{out}");
    }

    // Wheel contact against a straight road
    let road = RoadStrip::new(
        (0..100)
            .map(|i| {
                let y = i as f32 * 2.0;
                RoadPatch::new([
                    TVec3::new(-4.0, y + 2.0, 0.0),
                    TVec3::new(4.0, y + 2.0, 0.0),
                    TVec3::new(4.0, y, 0.0),
                    TVec3::new(-4.0, y, 0.0),
                ])
            })
            .collect(),
    );

    let down = TVec3::new(0.0, 0.0, -1.0);
    let wheel = TVec3::new(1.3, 51.1, 0.5);
    let contact = road.collide(wheel, down, 1.0, None);
    assert_eq!(contact.map(|(patch, _)| patch), Some(25));
    if let Some((patch, hit)) = contact {
        println!("wheel touches patch {patch} at {} ({})", hit.point, hit.distance);
    }

    // Next step, same patch: the hint skips the broad phase
    let wheel = TVec3::new(1.3, 51.4, 0.5);
    assert_eq!(road.collide(wheel, down, 1.0, Some(25)).map(|(patch, _)| patch), Some(25));

    Ok(())
}
