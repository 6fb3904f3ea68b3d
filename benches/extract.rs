use classmap::structure::{ExtractOptions, Extractor};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::path::{Path, PathBuf};

fn setup_tree(files: usize) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "classmap-bench-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    for i in 0..files {
        let dir = root.join(format!("pkg{}", i % 8));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("mod{i}.py")), module_source(i)).unwrap();
    }
    root
}

fn module_source(i: usize) -> String {
    let mut out = String::new();
    for c in 0..10 {
        let base = if c == 0 { String::new() } else { format!("(Base{i}_{})", c - 1) };
        out.push_str(&format!("class Base{i}_{c}{base}:\n"));
        out.push_str("    limit = 10\n    name = 'x'\n");
        out.push_str("    for step in range(3):\n        pass\n");
        for m in 0..5 {
            out.push_str(&format!("    def method_{m}(self, value):\n"));
            out.push_str("        if value:\n            return value\n        return None\n");
        }
        out.push('\n');
    }
    out
}

fn cleanup_tree(root: &Path) {
    let _ = std::fs::remove_dir_all(root);
}

fn bench_extract(c: &mut Criterion) {
    let root = setup_tree(200);
    let mut extractor = Extractor::new(ExtractOptions::default()).unwrap();

    c.bench_function("extract_200_files", |b| {
        b.iter(|| {
            let report = extractor.extract(black_box(&root)).unwrap();
            black_box(report.class_count)
        })
    });

    cleanup_tree(&root);
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
