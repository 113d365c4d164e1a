//! Utility to explore PPTX masters, layouts and slides for development
use slidemaker::container::OoxmlContainer;
use slidemaker::Presentation;

fn main() -> slidemaker::Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: explore_pptx <deck.pptx>");
        std::process::exit(2);
    };

    let container = OoxmlContainer::open(&path)?;
    println!("=== Files in archive ===");
    for file in container.list_files() {
        println!("  {}", file);
    }
    let presentation = Presentation::open(&path)?;

    if let Some((cx, cy)) = presentation.slide_size() {
        println!(
            "\nSlide size: {:.2}in x {:.2}in",
            slidemaker::units::to_inches(cx),
            slidemaker::units::to_inches(cy)
        );
    }

    println!("\n=== Slide masters ===");
    for master in presentation.masters() {
        println!("{} ({} layouts)", master.part_name, master.layouts.len());
        for ph in &master.placeholders {
            println!("    [{}] idx={} {:?}", ph.kind.as_ooxml(), ph.idx, ph.extent);
        }
    }

    println!("\n=== Layouts (first master) ===");
    match presentation.layouts() {
        Ok(layouts) => {
            for layout in layouts {
                let info = layout.info();
                println!("{:>3}  {} ({}) -> {}", info.index, info.name, info.layout_type, layout.part_name);
                for ph in &layout.placeholders {
                    println!("       [{}] idx={} \"{}\"", ph.kind.as_ooxml(), ph.idx, ph.name);
                }
            }
        }
        Err(e) => println!("  {}", e),
    }

    println!("\n=== Slides ===");
    for index in 0..presentation.slide_count() {
        let slide = presentation.slide(index)?;
        println!(
            "{:>3}  {} layout={} title={:?}",
            index,
            slide.part_name(),
            slide.layout_part().unwrap_or_default(),
            slide.title().unwrap_or_default()
        );
        for text in slide.shape_texts() {
            if !text.is_empty() {
                println!("       {}", text.replace('\n', " / "));
            }
        }
        if slide.picture_count() > 0 {
            println!("       ({} pictures)", slide.picture_count());
        }
    }

    Ok(())
}
