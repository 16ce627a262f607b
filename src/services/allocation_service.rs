/// Availability of one chapter for a single question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCapacity<K> {
    pub chapter_id: K,
    pub available: u32,
}

impl<K> ChapterCapacity<K> {
    pub fn new(chapter_id: K, available: u32) -> Self {
        Self {
            chapter_id,
            available,
        }
    }
}

pub struct AllocationService;

impl AllocationService {
    /// Spreads `required` questions over `chapters` as evenly as their caps
    /// allow.
    ///
    /// The result keeps the input order, never exceeds a chapter's
    /// `available`, sums to `min(required, sum(available))` and leaves out
    /// chapters that received nothing.
    pub fn distribute<K: Clone>(required: u32, chapters: &[ChapterCapacity<K>]) -> Vec<(K, u32)> {
        if required == 0 || chapters.is_empty() {
            return Vec::new();
        }

        let n = chapters.len() as u64;
        let base = u64::from(required) / n;
        let extra = u64::from(required) % n;

        let mut allocated: Vec<u32> = Vec::with_capacity(chapters.len());
        let mut shortfall: u64 = 0;
        for (idx, chapter) in chapters.iter().enumerate() {
            let wanted = base + u64::from((idx as u64) < extra);
            let given = wanted.min(u64::from(chapter.available));
            shortfall += wanted - given;
            allocated.push(given as u32);
        }

        while shortfall > 0 {
            let open: Vec<usize> = (0..chapters.len())
                .filter(|&i| allocated[i] < chapters[i].available)
                .collect();
            if open.is_empty() {
                break;
            }

            let k = open.len() as u64;
            let share = shortfall / k;
            let remainder = shortfall % k;
            for (pos, &i) in open.iter().enumerate() {
                let wanted = share + u64::from((pos as u64) < remainder);
                let headroom = u64::from(chapters[i].available - allocated[i]);
                let given = wanted.min(headroom);
                allocated[i] += given as u32;
                shortfall -= given;
            }
        }

        chapters
            .iter()
            .zip(allocated)
            .filter(|(_, count)| *count > 0)
            .map(|(chapter, count)| (chapter.chapter_id.clone(), count))
            .collect()
    }

    pub fn total_available<K>(chapters: &[ChapterCapacity<K>]) -> u64 {
        chapters.iter().map(|c| u64::from(c.available)).sum()
    }
}
