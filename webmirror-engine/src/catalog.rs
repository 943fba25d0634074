use crate::job::MirrorJob;

/// One class of embedded resource to scan for: elements named `tag`
/// carrying `attr`, stored with `default_ext` when the URL path has no
/// extension of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub tag: &'static str,
    pub attr: &'static str,
    pub default_ext: &'static str,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Script,
    Stylesheet,
    Image,
    Hyperlink,
    Multimedia,
}

/// The fixed scan order. Entries are independent of each other; the
/// order only determines processing order within a page.
pub const CATALOG: [ResourceRef; 8] = [
    ResourceRef { tag: "script", attr: "src", default_ext: "js", category: Category::Script },
    ResourceRef { tag: "link", attr: "href", default_ext: "css", category: Category::Stylesheet },
    ResourceRef { tag: "img", attr: "src", default_ext: "jpg", category: Category::Image },
    ResourceRef { tag: "a", attr: "href", default_ext: "html", category: Category::Hyperlink },
    ResourceRef { tag: "video", attr: "poster", default_ext: "jpg", category: Category::Multimedia },
    ResourceRef { tag: "source", attr: "src", default_ext: "mp4", category: Category::Multimedia },
    ResourceRef { tag: "video", attr: "src", default_ext: "mp4", category: Category::Multimedia },
    ResourceRef { tag: "audio", attr: "src", default_ext: "mp3", category: Category::Multimedia },
];

/// Catalog entries enabled by the job's download toggles, scan order
/// preserved. Scripts and stylesheets are always on.
pub fn enabled_entries(job: &MirrorJob) -> Vec<&'static ResourceRef> {
    CATALOG
        .iter()
        .filter(|entry| match entry.category {
            Category::Script | Category::Stylesheet => true,
            Category::Image => job.download_images(),
            Category::Hyperlink => job.download_hyperlinks(),
            Category::Multimedia => job.download_multimedia(),
        })
        .collect()
}
