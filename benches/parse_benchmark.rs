use bvh_playback::parse;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A chain of `joints` joints with ZXY rotations, `frames` rows of motion.
fn synthetic_bvh(joints: usize, frames: usize) -> String {
    let mut text = String::from("HIERARCHY\nROOT Hips\n{\nOFFSET 0 90 0\n");
    text.push_str("CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n");
    for i in 0..joints {
        text.push_str(&format!(
            "JOINT j{i}\n{{\nOFFSET 0 5.5 0\nCHANNELS 3 Zrotation Xrotation Yrotation\n"
        ));
    }
    text.push_str("End Site\n{\nOFFSET 0 2 0\n}\n");
    for _ in 0..=joints {
        text.push_str("}\n");
    }
    text.push_str(&format!("MOTION\nFrames: {frames}\nFrame Time: 0.008333\n"));
    for f in 0..frames {
        let mut row = format!("{} 90.0 0.0 0.0 0.0 0.0", f as f64 * 0.1);
        for j in 0..joints {
            row.push_str(&format!(" {:.3} {:.3} {:.3}", j as f64, f as f64 * 0.5, -(f as f64)));
        }
        text.push_str(&row);
        text.push('\n');
    }
    text
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let clip = synthetic_bvh(30, 600);

    let mut group = c.benchmark_group("sample-size-example");
    group.sample_size(10);
    group.bench_function("parse 30 joints x 600 frames", |b| {
        b.iter(|| black_box(parse(black_box(&clip)).map(|s| s.frame_count())))
    });
    group.bench_function("global pose", |b| {
        let skeleton = parse(&clip).expect("synthetic clip parses");
        b.iter(|| black_box(skeleton.global_pose(black_box(300))))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
